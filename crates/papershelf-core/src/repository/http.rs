use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;

use super::{PaperRepository, RepoFuture};
use crate::{
    Collection, CreatedPaper, ErrorPayload, ExtractedMetadata, Membership, Paper, PaperId,
    PaperInput, ReadingStatus, RepoError,
};

/// Default backend origin used by the original web client.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// [`PaperRepository`] backed by the REST API.
pub struct HttpRepository {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRepository {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RepoError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("papershelf/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url, timeout))
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a non-2xx response into [`RepoError::Server`], keeping its body.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, RepoError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let payload = ErrorPayload::from_body(&body);
    tracing::debug!(status = status.as_u16(), ?payload, "backend returned error");
    Err(RepoError::Server {
        status: status.as_u16(),
        payload,
    })
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, RepoError> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| RepoError::Decode(e.to_string()))
}

impl PaperRepository for HttpRepository {
    fn list_papers(&self) -> RepoFuture<'_, Vec<Paper>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.url("/papers"))
                .timeout(self.timeout)
                .send()
                .await?;
            let papers: Vec<Paper> = decode(check(resp).await?).await?;
            tracing::info!(count = papers.len(), "loaded papers");
            Ok(papers)
        })
    }

    fn get_paper(&self, id: PaperId) -> RepoFuture<'_, Paper> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.url(&format!("/paper_/{id}")))
                .timeout(self.timeout)
                .send()
                .await?;
            decode(check(resp).await?).await
        })
    }

    fn create_paper<'a>(&'a self, input: &'a PaperInput) -> RepoFuture<'a, CreatedPaper> {
        Box::pin(async move {
            let resp = self
                .client
                .post(self.url("/add-paper/"))
                .json(input)
                .timeout(self.timeout)
                .send()
                .await?;
            let created: CreatedPaper = decode(check(resp).await?).await?;
            tracing::info!(paper_id = created.paper_id, title = %input.title, "paper created");
            Ok(created)
        })
    }

    fn delete_paper(&self, id: PaperId) -> RepoFuture<'_, ()> {
        Box::pin(async move {
            let resp = self
                .client
                .delete(self.url(&format!("/papers/{id}")))
                .timeout(self.timeout)
                .send()
                .await?;
            check(resp).await?;
            Ok(())
        })
    }

    fn set_favourite(&self, id: PaperId, favourite: bool) -> RepoFuture<'_, ()> {
        Box::pin(async move {
            let resp = self
                .client
                .post(self.url("/api/updateFavouriteStatus"))
                .json(&json!({ "paper_id": id, "isFavourite": favourite }))
                .timeout(self.timeout)
                .send()
                .await?;
            check(resp).await?;
            Ok(())
        })
    }

    fn set_status(&self, id: PaperId, status: ReadingStatus) -> RepoFuture<'_, ()> {
        Box::pin(async move {
            let resp = self
                .client
                .post(self.url("/api/updateStatus"))
                .json(&json!({ "paper_id": id, "new_status": status.label() }))
                .timeout(self.timeout)
                .send()
                .await?;
            check(resp).await?;
            Ok(())
        })
    }

    fn paper_collections(&self, id: PaperId) -> RepoFuture<'_, Membership> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.url(&format!("/paper-collections/{id}")))
                .timeout(self.timeout)
                .send()
                .await?;
            decode(check(resp).await?).await
        })
    }

    fn set_collections<'a>(
        &'a self,
        id: PaperId,
        membership: &'a Membership,
    ) -> RepoFuture<'a, ()> {
        Box::pin(async move {
            let resp = self
                .client
                .post(self.url("/update-paper-collections/"))
                .json(&json!({ "paper_id": id, "collections": membership }))
                .timeout(self.timeout)
                .send()
                .await?;
            check(resp).await?;
            Ok(())
        })
    }

    fn list_collections(&self) -> RepoFuture<'_, Vec<Collection>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.url("/get-collections/"))
                .timeout(self.timeout)
                .send()
                .await?;
            decode(check(resp).await?).await
        })
    }

    fn add_collection<'a>(&'a self, collection: &'a Collection) -> RepoFuture<'a, Collection> {
        Box::pin(async move {
            let resp = self
                .client
                .post(self.url("/add-collection/"))
                .json(collection)
                .timeout(self.timeout)
                .send()
                .await?;
            decode(check(resp).await?).await
        })
    }

    fn delete_collection<'a>(&'a self, name: &'a str) -> RepoFuture<'a, ()> {
        Box::pin(async move {
            let path = format!("/delete-collection/{}/", urlencoding::encode(name));
            let resp = self
                .client
                .delete(self.url(&path))
                .timeout(self.timeout)
                .send()
                .await?;
            check(resp).await?;
            Ok(())
        })
    }

    fn extract_metadata<'a>(
        &'a self,
        file_name: &'a str,
        bytes: Vec<u8>,
    ) -> RepoFuture<'a, ExtractedMetadata> {
        Box::pin(async move {
            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name(file_name.to_string())
                .mime_str("application/pdf")?;
            let form = reqwest::multipart::Form::new().part("file", part);
            // Extraction goes through GROBID on the server and can take a while.
            let resp = self
                .client
                .post(self.url("/extract/"))
                .multipart(form)
                .timeout(self.timeout * 4)
                .send()
                .await?;
            decode(check(resp).await?).await
        })
    }

    fn ask_chatbot<'a>(
        &'a self,
        query: &'a str,
        paper_id: Option<PaperId>,
        top_k: u32,
    ) -> RepoFuture<'a, String> {
        Box::pin(async move {
            let mut params = vec![("query", query.to_string()), ("top_k", top_k.to_string())];
            if let Some(id) = paper_id {
                params.push(("paper_id", id.to_string()));
            }
            let resp = self
                .client
                .post(self.url("/chatbot"))
                .query(&params)
                .header("Accept", "application/json")
                .timeout(self.timeout * 4)
                .send()
                .await?;
            let text = check(resp).await?.text().await?;
            // The endpoint returns a JSON string; tolerate plain text too.
            Ok(serde_json::from_str::<String>(&text).unwrap_or(text))
        })
    }

    fn pdf_url(&self, pdf_path: &str) -> String {
        pdf_url(&self.base_url, pdf_path)
    }
}

/// Where the backend serves a stored PDF. Windows separators in stored paths
/// are turned into URL separators.
pub fn pdf_url(base_url: &str, pdf_path: &str) -> String {
    let path = pdf_path.replace('\\', "/");
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> HttpRepository {
        HttpRepository::with_client(
            reqwest::Client::new(),
            "http://localhost:8000/",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        assert_eq!(repo().base_url(), "http://localhost:8000");
        assert_eq!(repo().url("/papers"), "http://localhost:8000/papers");
    }

    #[test]
    fn pdf_url_normalizes_backslashes() {
        assert_eq!(
            repo().pdf_url("uploads\\2024\\paper.pdf"),
            "http://localhost:8000/uploads/2024/paper.pdf"
        );
        assert_eq!(
            repo().pdf_url("/uploads/a.pdf"),
            "http://localhost:8000/uploads/a.pdf"
        );
    }
}
