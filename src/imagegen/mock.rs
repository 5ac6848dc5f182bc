use super::ImageTaskApi;
use crate::models::{ImageTaskRequest, ImageTaskStatusResponse, TaskStatus};
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted image task backend for tests.
///
/// Status polls walk through the configured sequence and then repeat the
/// final entry; downloads return the configured bytes.
#[derive(Clone)]
pub struct MockImageTaskApi {
    statuses: Arc<Mutex<Vec<TaskStatus>>>,
    image_bytes: Arc<Mutex<Vec<u8>>>,
    error_message: Arc<Mutex<Option<String>>>,
    submit_count: Arc<Mutex<usize>>,
    status_count: Arc<Mutex<usize>>,
}

impl MockImageTaskApi {
    pub fn new() -> Self {
        Self {
            statuses: Arc::new(Mutex::new(vec![TaskStatus::Succeed])),
            image_bytes: Arc::new(Mutex::new(Vec::new())),
            error_message: Arc::new(Mutex::new(None)),
            submit_count: Arc::new(Mutex::new(0)),
            status_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_status_sequence(self, statuses: &[TaskStatus]) -> Self {
        *self.statuses.lock().unwrap() = statuses.to_vec();
        self
    }

    pub fn with_image_bytes(self, bytes: Vec<u8>) -> Self {
        *self.image_bytes.lock().unwrap() = bytes;
        self
    }

    pub fn with_error_message(self, message: &str) -> Self {
        *self.error_message.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn submit_count(&self) -> usize {
        *self.submit_count.lock().unwrap()
    }

    pub fn status_count(&self) -> usize {
        *self.status_count.lock().unwrap()
    }
}

impl Default for MockImageTaskApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageTaskApi for MockImageTaskApi {
    async fn submit_task(&self, request: ImageTaskRequest) -> Result<String> {
        let mut count = self.submit_count.lock().unwrap();
        *count += 1;
        Ok(format!("mock-task-{}-{}", request.model.len(), *count))
    }

    async fn task_status(&self, _task_id: &str) -> Result<ImageTaskStatusResponse> {
        let mut count = self.status_count.lock().unwrap();
        *count += 1;

        let statuses = self.statuses.lock().unwrap();
        let index = (*count - 1).min(statuses.len() - 1);
        let status = statuses[index];

        Ok(ImageTaskStatusResponse {
            task_status: status,
            output_images: if status == TaskStatus::Succeed {
                vec!["https://mock.example/result.png".to_string()]
            } else {
                Vec::new()
            },
            error_message: self.error_message.lock().unwrap().clone(),
        })
    }

    async fn download(&self, _url: &str) -> Result<Vec<u8>> {
        Ok(self.image_bytes.lock().unwrap().clone())
    }
}
