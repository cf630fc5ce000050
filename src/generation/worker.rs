use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::ChatError;

use super::request::GenerationRequest;
use super::traits::TextGenerator;

/// Consumer side of a background generation.
///
/// Dropping the handle cancels the producer, so a client that disconnects
/// mid-stream stops the model instead of leaving it running.
pub struct GenerationHandle {
    receiver: mpsc::Receiver<Result<String, ChatError>>,
    _guard: DropGuard,
}

impl GenerationHandle {
    pub async fn recv(&mut self) -> Option<Result<String, ChatError>> {
        self.receiver.recv().await
    }

    /// Adapts the handle into a stream of fragments. Cancellation still
    /// fires when the stream is dropped.
    pub fn into_stream(self) -> impl futures::Stream<Item = Result<String, ChatError>> + Send {
        futures::stream::unfold(self, |mut handle| async move {
            handle.recv().await.map(|item| (item, handle))
        })
    }
}

/// Runs `generator` on a background task and hands fragments over a bounded
/// channel of `capacity` slots.
pub fn spawn_generation(
    generator: Arc<dyn TextGenerator>,
    request: GenerationRequest,
    capacity: usize,
) -> GenerationHandle {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let cancel = CancellationToken::new();
    tokio::spawn(run_generation(generator, request, sender, cancel.clone()));
    GenerationHandle {
        receiver,
        _guard: cancel.drop_guard(),
    }
}

async fn run_generation(
    generator: Arc<dyn TextGenerator>,
    request: GenerationRequest,
    sender: mpsc::Sender<Result<String, ChatError>>,
    cancel: CancellationToken,
) {
    let start_time = Instant::now();

    let mut stream = tokio::select! {
        _ = cancel.cancelled() => return,
        result = generator.generate_stream(&request) => match result {
            Ok(stream) => stream,
            Err(err) => {
                let _ = sender.send(Err(err)).await;
                return;
            }
        },
    };

    let mut fragments = 0usize;
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                log::debug!("generation cancelled after {fragments} fragments");
                return;
            }
            next = stream.next() => next,
        };
        let Some(item) = next else { break };
        let failed = item.is_err();
        if sender.send(item).await.is_err() {
            log::debug!("generation consumer went away after {fragments} fragments");
            return;
        }
        if failed {
            break;
        }
        fragments += 1;
    }

    log::debug!(
        "generation finished in {:?} ({fragments} fragments)",
        start_time.elapsed()
    );
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::generation::{FragmentStream, HealthProvider, ModelInfo};

    struct Scripted {
        fragments: Vec<Result<String, ChatError>>,
    }

    #[async_trait]
    impl HealthProvider for Scripted {}

    #[async_trait]
    impl TextGenerator for Scripted {
        fn info(&self) -> ModelInfo {
            ModelInfo {
                name: "scripted".into(),
                device: "cpu".into(),
                kind: "test".into(),
            }
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, ChatError> {
            Ok(String::new())
        }

        async fn generate_stream(
            &self,
            _request: &GenerationRequest,
        ) -> Result<FragmentStream, ChatError> {
            let items: Vec<_> = self
                .fragments
                .iter()
                .map(|f| match f {
                    Ok(s) => Ok(s.clone()),
                    Err(e) => Err(ChatError::ProviderError(e.to_string())),
                })
                .collect();
            Ok(Box::pin(futures::stream::iter(items)))
        }
    }

    struct Endless {
        stopped: Arc<AtomicBool>,
    }

    #[async_trait]
    impl HealthProvider for Endless {}

    #[async_trait]
    impl TextGenerator for Endless {
        fn info(&self) -> ModelInfo {
            ModelInfo {
                name: "endless".into(),
                device: "cpu".into(),
                kind: "test".into(),
            }
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, ChatError> {
            Ok(String::new())
        }

        async fn generate_stream(
            &self,
            _request: &GenerationRequest,
        ) -> Result<FragmentStream, ChatError> {
            let guard = StopFlag(self.stopped.clone());
            Ok(Box::pin(futures::stream::unfold(guard, |guard| async move {
                tokio::task::yield_now().await;
                Some((Ok("tok ".to_string()), guard))
            })))
        }
    }

    struct StopFlag(Arc<AtomicBool>);

    impl Drop for StopFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("q", 16)
    }

    #[tokio::test]
    async fn relays_fragments_in_order() {
        let generator = Arc::new(Scripted {
            fragments: vec![Ok("<think>".into()), Ok("a".into()), Ok("</think>b".into())],
        });
        let fragments: Vec<String> = spawn_generation(generator, request(), 1)
            .into_stream()
            .map(|f| f.unwrap())
            .collect()
            .await;
        assert_eq!(fragments, vec!["<think>", "a", "</think>b"]);
    }

    #[tokio::test]
    async fn stops_after_first_error() {
        let generator = Arc::new(Scripted {
            fragments: vec![
                Ok("a".into()),
                Err(ChatError::Generic("boom".into())),
                Ok("never".into()),
            ],
        });
        let items: Vec<_> = spawn_generation(generator, request(), 4)
            .into_stream()
            .collect()
            .await;
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn dropping_the_handle_stops_the_producer() {
        let stopped = Arc::new(AtomicBool::new(false));
        let generator = Arc::new(Endless {
            stopped: stopped.clone(),
        });
        let mut handle = spawn_generation(generator, request(), 2);
        assert!(handle.recv().await.is_some());
        drop(handle);

        for _ in 0..100 {
            if stopped.load(Ordering::SeqCst) {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("producer kept running after the consumer left");
    }
}
