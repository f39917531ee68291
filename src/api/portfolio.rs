//! Public portfolio endpoints: skills and the resume.

use reqwest::Method;
use std::path::Path;
use tracing::info;

use super::{Access, ApiClient};
use crate::error::{ClientError, ClientResult};
use crate::models::{ListResponse, Resume, Skill};

pub struct PortfolioApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PortfolioApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn skills(&self) -> ClientResult<Vec<Skill>> {
        let list: ListResponse<Skill> = self
            .client
            .call(
                Method::GET,
                "/portfolio/skills/",
                Access::Public,
                "Failed to fetch skills",
                |b| b,
            )
            .await?;
        Ok(list.into_vec())
    }

    pub async fn resume(&self) -> ClientResult<Resume> {
        self.client
            .call(
                Method::GET,
                "/portfolio/resume/",
                Access::Public,
                "Failed to fetch resume data",
                |b| b,
            )
            .await
    }

    /// Save the resume document to `dest`. Returns the number of bytes written.
    ///
    /// Nothing is written when the download fails.
    pub async fn download_resume(&self, dest: &Path) -> ClientResult<u64> {
        let bytes = self
            .client
            .download(
                "/portfolio/resume/download/",
                Access::Public,
                "Failed to download resume",
            )
            .await?;

        tokio::fs::write(dest, &bytes).await.map_err(|e| {
            ClientError::Storage(format!("Cannot write {}: {}", dest.display(), e))
        })?;
        info!(path = %dest.display(), bytes = bytes.len(), "Resume downloaded");
        Ok(bytes.len() as u64)
    }
}
