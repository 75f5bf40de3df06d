use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Lifetime of the download link handed back with an archived export.
pub const DOWNLOAD_URL_TTL: Duration = Duration::from_secs(60);

/// Bucket that keeps the latest export of each résumé.
#[derive(Clone)]
pub struct ExportArchive {
    client: S3Client,
    bucket: String,
}

pub struct ArchivedExport {
    pub key: String,
    pub download_url: String,
}

impl ExportArchive {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Uploads the Markdown and returns a short-lived download link for it.
    /// Each résumé has one object; a new export overwrites the previous one.
    pub async fn store_markdown(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
        content: &str,
    ) -> Result<ArchivedExport, AppError> {
        let key = object_key(user_id, resume_id, "md");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(content.as_bytes().to_vec()))
            .content_type("text/markdown; charset=utf-8")
            .send()
            .await
            .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;

        info!("Uploaded export to s3://{}/{}", self.bucket, key);

        let presigning = PresigningConfig::expires_in(DOWNLOAD_URL_TTL)
            .map_err(|e| AppError::S3(format!("presigning config: {e}")))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::S3(format!("presigning {key} failed: {e}")))?;

        Ok(ArchivedExport {
            download_url: presigned.uri().to_string(),
            key,
        })
    }
}

pub fn object_key(user_id: Uuid, resume_id: Uuid, ext: &str) -> String {
    format!("{user_id}/resume_{resume_id}.{ext}")
}
