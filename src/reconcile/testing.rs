//! Scripted in-memory remote client for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::model::ContentType;
use crate::remote::{RemoteImage, RemoteImageApi, RemoteImagePayload};

/// A scripted remote failure.
#[derive(Debug, Clone)]
pub(crate) enum Failure {
    Forbidden,
    NotFound,
    Remote(u16, &'static str),
    NonJson(&'static str),
}

impl Failure {
    fn into_error(self) -> Error {
        match self {
            Self::Forbidden => Error::Forbidden,
            Self::NotFound => Error::NotFound,
            Self::Remote(status, message) => Error::remote(status, message),
            Self::NonJson(content_type) => Error::Content(content_type.to_string()),
        }
    }
}

/// Scripted remote image service.
///
/// Serves records from `images`, fails any verb whose failure slot is
/// set, and counts calls so tests can assert a verb was never reached.
#[derive(Default)]
pub(crate) struct MockRemote {
    pub images: Mutex<Vec<RemoteImage>>,
    pub create_failure: Option<Failure>,
    pub list_failure: Option<Failure>,
    pub read_failure: Option<Failure>,
    pub update_failure: Option<Failure>,
    pub patch_failure: Option<Failure>,
    pub delete_failure: Option<Failure>,
    pub create_calls: AtomicUsize,
    pub patch_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

/// Fixed timestamp used by scripted records.
pub(crate) fn t1() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// A fully populated remote record.
pub(crate) fn remote_image(id: &str, description: &str, location: &str) -> RemoteImage {
    RemoteImage {
        id: id.to_string(),
        image_url: Some(format!("https://images.example.com/public/{id}")),
        description: Some(description.to_string()),
        location: Some(location.to_string()),
        content_type: Some(ContentType::Jpeg),
        created_at: Some(t1()),
        updated_at: Some(t1()),
    }
}

impl MockRemote {
    pub fn with_images(images: Vec<RemoteImage>) -> Self {
        Self {
            images: Mutex::new(images),
            ..Self::default()
        }
    }
}

#[async_trait]
impl RemoteImageApi for MockRemote {
    async fn create(&self, payload: &RemoteImagePayload, _token: &str) -> Result<RemoteImage> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = &self.create_failure {
            return Err(failure.clone().into_error());
        }
        let image = RemoteImage {
            id: "generated-1".to_string(),
            image_url: Some("https://images.example.com/public/generated-1".to_string()),
            description: None,
            location: None,
            content_type: Some(payload.content_type),
            created_at: Some(t1()),
            updated_at: Some(t1()),
        };
        self.images.lock().unwrap().push(image.clone());
        Ok(image)
    }

    async fn list(&self, _token: &str) -> Result<Vec<RemoteImage>> {
        if let Some(failure) = &self.list_failure {
            return Err(failure.clone().into_error());
        }
        Ok(self.images.lock().unwrap().clone())
    }

    async fn read(&self, id: &str, _token: &str) -> Result<RemoteImage> {
        if let Some(failure) = &self.read_failure {
            return Err(failure.clone().into_error());
        }
        self.images
            .lock()
            .unwrap()
            .iter()
            .find(|image| image.id == id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn update(&self, _id: &str, _payload: &RemoteImagePayload, _token: &str) -> Result<()> {
        if let Some(failure) = &self.update_failure {
            return Err(failure.clone().into_error());
        }
        Ok(())
    }

    async fn patch_content_type(
        &self,
        _id: &str,
        _content_type: ContentType,
        _token: &str,
    ) -> Result<()> {
        self.patch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = &self.patch_failure {
            return Err(failure.clone().into_error());
        }
        Ok(())
    }

    async fn delete(&self, id: &str, _token: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = &self.delete_failure {
            return Err(failure.clone().into_error());
        }
        self.images.lock().unwrap().retain(|image| image.id != id);
        Ok(())
    }
}
