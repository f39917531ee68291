//! Request status transitions.
//!
//! Client-driven moves (price, pay) have fixed preconditions. Admin status
//! overwrites go through a [`TransitionPolicy`]: permissive by default, or a
//! strict table that only allows forward moves and cancellation.

use crate::error::{ClientError, ClientResult};
use crate::models::{HiringRequest, RequestStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Any status may be set from any status.
    #[default]
    Permissive,
    /// Forward along pending → priced → paid → in_progress → completed, or
    /// to cancelled from any non-terminal status.
    Strict,
}

impl TransitionPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Permissive
        }
    }

    pub fn allows(&self, from: RequestStatus, to: RequestStatus) -> bool {
        match self {
            Self::Permissive => true,
            Self::Strict => {
                if from == to || from.is_terminal() {
                    return false;
                }
                if to == RequestStatus::Cancelled {
                    return true;
                }
                matches!((from.rank(), to.rank()), (Some(a), Some(b)) if b > a)
            }
        }
    }

    pub fn check(&self, from: RequestStatus, to: RequestStatus) -> ClientResult<()> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(ClientError::InvalidTransition { from, to })
        }
    }

    /// Statuses an admin may pick for a request currently in `from`.
    pub fn targets(&self, from: RequestStatus) -> Vec<RequestStatus> {
        RequestStatus::ALL
            .into_iter()
            .filter(|to| *to != from && self.allows(from, *to))
            .collect()
    }
}

/// A price may only be quoted once, on a pending request.
pub fn can_price(request: &HiringRequest) -> ClientResult<()> {
    if request.status != RequestStatus::Pending {
        return Err(ClientError::InvalidTransition {
            from: request.status,
            to: RequestStatus::Priced,
        });
    }
    if request.quoted_price.is_some() {
        return Err(ClientError::Precondition(
            "This request already has a quoted price".to_string(),
        ));
    }
    Ok(())
}

/// Payment needs a priced request carrying a quote. Returns the quote.
pub fn can_pay(request: &HiringRequest) -> ClientResult<f64> {
    let Some(price) = request.quoted_price else {
        return Err(ClientError::Precondition(
            "No price has been quoted for this request".to_string(),
        ));
    };
    if request.status != RequestStatus::Priced {
        return Err(ClientError::InvalidTransition {
            from: request.status,
            to: RequestStatus::Paid,
        });
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequestStatus::*;

    fn request(status: RequestStatus, price: Option<f64>) -> HiringRequest {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "ticket_number": "HR-1",
            "title": "Build me a site",
            "status": status,
            "quoted_price": price,
        }))
        .unwrap()
    }

    #[test]
    fn test_permissive_allows_everything() {
        let policy = TransitionPolicy::default();
        assert!(policy.allows(Completed, Pending));
        assert!(policy.allows(Cancelled, InProgress));
        assert_eq!(policy.targets(Paid).len(), 5);
    }

    #[test]
    fn test_strict_table() {
        let policy = TransitionPolicy::Strict;
        assert!(policy.allows(Pending, Priced));
        assert!(policy.allows(Paid, InProgress));
        assert!(policy.allows(InProgress, Completed));
        assert!(policy.allows(Priced, Cancelled));
        assert!(!policy.allows(Completed, Cancelled));
        assert!(!policy.allows(Cancelled, Pending));
        assert!(!policy.allows(InProgress, Paid));
        assert!(!policy.allows(Paid, Paid));
        assert_eq!(policy.targets(InProgress), vec![Completed, Cancelled]);
        assert!(policy.targets(Completed).is_empty());

        let err = policy.check(Completed, Pending).unwrap_err();
        assert!(matches!(err, ClientError::InvalidTransition { .. }));
    }

    #[test]
    fn test_price_preconditions() {
        assert!(can_price(&request(Pending, None)).is_ok());
        assert!(can_price(&request(Priced, Some(10.0))).is_err());
        assert!(matches!(
            can_price(&request(Pending, Some(10.0))),
            Err(ClientError::Precondition(_))
        ));
    }

    #[test]
    fn test_pay_preconditions() {
        assert_eq!(can_pay(&request(Priced, Some(99.5))).unwrap(), 99.5);

        let err = can_pay(&request(Priced, None)).unwrap_err();
        assert_eq!(err.to_string(), "No price has been quoted for this request");

        assert!(matches!(
            can_pay(&request(Paid, Some(99.5))),
            Err(ClientError::InvalidTransition { from: Paid, to: Paid })
        ));
    }
}
