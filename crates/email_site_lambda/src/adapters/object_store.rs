use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;

use super::{classify_sdk_error, StoreError};

pub trait BlobStore {
    /// Reads the whole object, refusing objects larger than `max_bytes`.
    fn read_object(&self, key: &str, max_bytes: u64) -> Result<Option<Vec<u8>>, StoreError>;
}

pub struct S3BlobStore {
    bucket: String,
    s3_client: aws_sdk_s3::Client,
}

impl S3BlobStore {
    pub fn new(s3_client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            s3_client,
        }
    }
}

impl BlobStore for S3BlobStore {
    fn read_object(&self, key: &str, max_bytes: u64) -> Result<Option<Vec<u8>>, StoreError> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = match client.get_object().bucket(bucket).key(object_key).send().await {
                    Ok(output) => output,
                    Err(error) if is_missing_object(&error) => return Ok(None),
                    Err(error) => return Err(classify_sdk_error("s3 get_object", error)),
                };

                let declared_length = output.content_length().unwrap_or_default();
                if u64::try_from(declared_length).unwrap_or_default() > max_bytes {
                    return Err(StoreError::TooLarge { limit: max_bytes });
                }

                let mut body = output.body;
                let mut bytes = Vec::new();
                while let Some(chunk) =
                    body.try_next()
                        .await
                        .map_err(|error| StoreError::Unavailable {
                            operation: "s3 get_object body",
                            message: error.to_string(),
                        })?
                {
                    if (bytes.len() + chunk.len()) as u64 > max_bytes {
                        return Err(StoreError::TooLarge { limit: max_bytes });
                    }
                    bytes.extend_from_slice(&chunk);
                }

                Ok(Some(bytes))
            })
        })
    }
}

/// A bare 404 without a modeled `NoSuchKey` body also counts as absence.
fn is_missing_object(error: &SdkError<GetObjectError>) -> bool {
    match error {
        SdkError::ServiceError(service) => {
            matches!(service.err(), GetObjectError::NoSuchKey(_))
                || service.raw().status().as_u16() == 404
        }
        _ => false,
    }
}
