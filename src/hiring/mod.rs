//! Hiring request workflow: submit, list, price, progress.

pub mod book;
pub mod lifecycle;
pub mod validation;

pub use book::RequestBook;
pub use lifecycle::{can_pay, can_price, TransitionPolicy};
pub use validation::{parse_price, RequestDraft};

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    active_services, HiringRequest, RequestFilter, RequestStatus, RequestUpdate, ServiceType,
};

#[derive(Clone)]
pub struct HiringService {
    api: ApiClient,
    book: Arc<RequestBook>,
    policy: TransitionPolicy,
}

impl HiringService {
    pub fn new(api: ApiClient, policy: TransitionPolicy) -> Self {
        Self {
            api,
            book: Arc::new(RequestBook::new()),
            policy,
        }
    }

    pub fn book(&self) -> &Arc<RequestBook> {
        &self.book
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Active services in catalog order.
    pub async fn services(&self) -> ClientResult<Vec<ServiceType>> {
        Ok(active_services(self.api.hiring().services().await?))
    }

    /// Validate and create a request. Anonymous requesters get their email
    /// remembered so later listings can find the request.
    pub async fn submit(&self, draft: &RequestDraft, today: NaiveDate) -> ClientResult<HiringRequest> {
        let session = self.api.session();
        let authenticated = session.is_authenticated();
        let body = draft.validate(authenticated, today)?;

        let created = self.api.hiring().create_request(&body).await?;

        if let Some(email) = body.email.as_deref().filter(|_| !authenticated) {
            if let Err(e) = session.remember_anonymous_email(email) {
                warn!(error = %e, "Could not remember requester email");
            }
        }

        info!(
            request_id = created.id,
            ticket = %created.ticket_number,
            anonymous = !authenticated,
            "Hiring request submitted"
        );
        self.book.upsert(created.clone());
        Ok(created)
    }

    /// List requests and replace the local book with the result.
    ///
    /// Without a session the listing is filtered by `email`, falling back to
    /// the remembered requester email. `status` narrows the listing server-side.
    pub async fn list(
        &self,
        email: Option<&str>,
        status: Option<RequestStatus>,
    ) -> ClientResult<Vec<HiringRequest>> {
        let mut filter = self.listing_filter(email)?;
        filter.status = status;
        let listing = self.api.hiring().list_requests(&filter).await?;
        listing.iter().for_each(audit);
        Ok(self.book.replace_all(listing))
    }

    fn listing_filter(&self, email: Option<&str>) -> ClientResult<RequestFilter> {
        if let Some(email) = email {
            return Ok(RequestFilter::by_email(email));
        }
        let session = self.api.session();
        if session.is_authenticated() {
            return Ok(RequestFilter::default());
        }
        session
            .anonymous_email()
            .map(RequestFilter::by_email)
            .ok_or_else(|| {
                ClientError::LoginRequired(
                    "Log in or provide the email used for your request".to_string(),
                )
            })
    }

    pub async fn get(&self, id: u64) -> ClientResult<HiringRequest> {
        let session = self.api.session();
        let email = if session.is_authenticated() {
            None
        } else {
            session.anonymous_email()
        };
        let request = self.api.hiring().get_request(id, email.as_deref()).await?;
        audit(&request);
        self.book.upsert(request.clone());
        Ok(request)
    }

    /// Quote a price on a pending request (`pending → priced`).
    pub async fn set_price(&self, id: u64, price_input: &str) -> ClientResult<HiringRequest> {
        let price = parse_price(price_input)?;
        let current = self.get(id).await?;
        can_price(&current)?;

        let updated = self
            .api
            .hiring()
            .update_request(id, &RequestUpdate::priced(price))
            .await?;
        info!(request_id = id, price, "Request priced");
        self.book.upsert(updated.clone());
        Ok(updated)
    }

    /// Admin status overwrite, checked against the transition policy.
    pub async fn set_status(&self, id: u64, status: RequestStatus) -> ClientResult<HiringRequest> {
        let current = self.get(id).await?;
        self.policy.check(current.status, status)?;

        let updated = self
            .api
            .hiring()
            .update_request(id, &RequestUpdate::status(status))
            .await?;
        info!(request_id = id, from = %current.status, to = %status, "Request status changed");
        self.book.upsert(updated.clone());
        Ok(updated)
    }

    pub async fn set_notes(&self, id: u64, notes: &str) -> ClientResult<HiringRequest> {
        let updated = self
            .api
            .hiring()
            .update_request(id, &RequestUpdate::notes(notes))
            .await?;
        info!(request_id = id, "Admin notes updated");
        self.book.upsert(updated.clone());
        Ok(updated)
    }

    pub async fn delete(&self, id: u64) -> ClientResult<()> {
        self.api.hiring().delete_request(id).await?;
        self.book.remove(id);
        info!(request_id = id, "Request deleted");
        Ok(())
    }
}

/// Server data breaking the price/status coupling is shown as-is, but logged.
fn audit(request: &HiringRequest) {
    if let Err(problem) = request.check_invariants() {
        warn!(request_id = request.id, "Inconsistent request: {}", problem);
    }
}
