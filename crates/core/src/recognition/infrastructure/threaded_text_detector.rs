use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use crossbeam_channel::{Sender, TrySendError};

use crate::recognition::domain::text_detector::{
    Completion, DetectionError, DetectionResult, TextDetector,
};
use crate::recognition::domain::text_recognizer::TextRecognizer;
use crate::recognition::domain::vision_image::VisionImage;
use crate::shared::constants::{DEFAULT_DETECTOR_QUEUE_CAPACITY, RECOGNIZER_THREAD_NAME};

struct Job {
    image: VisionImage,
    on_complete: Completion,
}

/// Runs a synchronous [`TextRecognizer`] on a dedicated worker thread.
///
/// Layout: `submit → [bounded queue] → worker → completion`
///
/// Completions run on the worker thread, one at a time, in submission order.
pub struct ThreadedTextDetector {
    job_tx: Mutex<Option<Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadedTextDetector {
    pub fn new(recognizer: Box<dyn TextRecognizer>) -> std::io::Result<Self> {
        Self::with_capacity(recognizer, DEFAULT_DETECTOR_QUEUE_CAPACITY)
    }

    pub fn with_capacity(
        recognizer: Box<dyn TextRecognizer>,
        capacity: usize,
    ) -> std::io::Result<Self> {
        let (job_tx, job_rx) = crossbeam_channel::bounded::<Job>(capacity.max(1));
        let worker = std::thread::Builder::new()
            .name(RECOGNIZER_THREAD_NAME.to_string())
            .spawn(move || {
                let mut recognizer = recognizer;
                for job in job_rx {
                    let result = recognize(recognizer.as_mut(), &job.image);
                    (job.on_complete)(result);
                }
                log::debug!("Recognizer worker exiting");
            })?;

        Ok(Self {
            job_tx: Mutex::new(Some(job_tx)),
            worker: Mutex::new(Some(worker)),
        })
    }
}

fn recognize(recognizer: &mut dyn TextRecognizer, image: &VisionImage) -> DetectionResult {
    recognizer.recognize(image).map_err(|e| {
        match e.downcast_ref::<DetectionError>() {
            Some(known) => known.clone(),
            None => DetectionError::Recognizer(e.to_string()),
        }
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TextDetector for ThreadedTextDetector {
    fn submit(&self, image: VisionImage, on_complete: Completion) {
        let job = Job { image, on_complete };
        let rejected = {
            let guard = lock(&self.job_tx);
            match guard.as_ref() {
                Some(tx) => match tx.try_send(job) {
                    Ok(()) => None,
                    Err(TrySendError::Full(job)) => {
                        // Release the lock before blocking so close() can proceed.
                        let tx = tx.clone();
                        drop(guard);
                        tx.send(job).err().map(|e| e.into_inner())
                    }
                    Err(TrySendError::Disconnected(job)) => Some(job),
                },
                None => Some(job),
            }
        };

        if let Some(job) = rejected {
            log::debug!(
                "Rejecting frame {} submitted to a closed detector",
                job.image.frame_index()
            );
            (job.on_complete)(Err(DetectionError::Closed));
        }
    }

    fn close(&self) -> Result<(), DetectionError> {
        drop(lock(&self.job_tx).take());
        let Some(worker) = lock(&self.worker).take() else {
            return Ok(());
        };
        worker.join().map_err(|_| DetectionError::WorkerPanicked)
    }
}

impl Drop for ThreadedTextDetector {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("Failed to close text detector: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::domain::recognized_text::{
        RecognizedText, TextBlock, TextElement, TextLine,
    };
    use crate::shared::frame::{Frame, ImageFormat};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct EchoRecognizer {
        calls: Arc<AtomicUsize>,
    }

    impl TextRecognizer for EchoRecognizer {
        fn recognize(
            &mut self,
            image: &VisionImage,
        ) -> Result<RecognizedText, Box<dyn std::error::Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = image.frame_index().to_string();
            Ok(RecognizedText::new(vec![TextBlock {
                text: text.clone(),
                bounding_box: None,
                lines: vec![TextLine {
                    text: text.clone(),
                    bounding_box: None,
                    elements: vec![TextElement {
                        text,
                        bounding_box: None,
                    }],
                }],
            }]))
        }
    }

    struct FailingRecognizer;

    impl TextRecognizer for FailingRecognizer {
        fn recognize(
            &mut self,
            _image: &VisionImage,
        ) -> Result<RecognizedText, Box<dyn std::error::Error>> {
            Err("model missing".into())
        }
    }

    struct UnavailableRecognizer;

    impl TextRecognizer for UnavailableRecognizer {
        fn recognize(
            &mut self,
            _image: &VisionImage,
        ) -> Result<RecognizedText, Box<dyn std::error::Error>> {
            Err(Box::new(DetectionError::ModelUnavailable("not downloaded".into())))
        }
    }

    struct PanickingRecognizer;

    impl TextRecognizer for PanickingRecognizer {
        fn recognize(
            &mut self,
            _image: &VisionImage,
        ) -> Result<RecognizedText, Box<dyn std::error::Error>> {
            panic!("recognizer blew up");
        }
    }

    fn image(index: usize) -> VisionImage {
        VisionImage::from_raw_rotation(Frame::new(vec![0u8; 6], index), 2, 2, 0, ImageFormat::Nv21)
            .unwrap()
    }

    fn submit_and_wait(detector: &ThreadedTextDetector, index: usize) -> DetectionResult {
        let (tx, rx) = crossbeam_channel::bounded(1);
        detector.submit(
            image(index),
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );
        rx.recv_timeout(Duration::from_secs(5))
            .expect("completion was never invoked")
    }

    #[test]
    fn test_completion_receives_recognizer_output() {
        let calls = Arc::new(AtomicUsize::new(0));
        let detector = ThreadedTextDetector::new(Box::new(EchoRecognizer {
            calls: calls.clone(),
        }))
        .unwrap();

        let result = submit_and_wait(&detector, 42).unwrap();

        assert_eq!(result.blocks[0].text, "42");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        detector.close().unwrap();
    }

    #[test]
    fn test_completion_runs_on_worker_thread() {
        let detector = ThreadedTextDetector::new(Box::new(FailingRecognizer)).unwrap();
        let (tx, rx) = crossbeam_channel::bounded(1);

        detector.submit(
            image(0),
            Box::new(move |_| {
                let name = std::thread::current().name().map(str::to_string);
                let _ = tx.send(name);
            }),
        );

        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some(RECOGNIZER_THREAD_NAME));
    }

    #[test]
    fn test_recognizer_error_is_mapped() {
        let detector = ThreadedTextDetector::new(Box::new(FailingRecognizer)).unwrap();

        let err = submit_and_wait(&detector, 0).unwrap_err();

        assert_eq!(err, DetectionError::Recognizer("model missing".to_string()));
    }

    #[test]
    fn test_detection_error_passes_through_unchanged() {
        let detector = ThreadedTextDetector::new(Box::new(UnavailableRecognizer)).unwrap();

        let err = submit_and_wait(&detector, 0).unwrap_err();

        assert_eq!(
            err,
            DetectionError::ModelUnavailable("not downloaded".to_string())
        );
    }

    #[test]
    fn test_submit_after_close_completes_with_closed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let detector = ThreadedTextDetector::new(Box::new(EchoRecognizer {
            calls: calls.clone(),
        }))
        .unwrap();
        detector.close().unwrap();

        let err = submit_and_wait(&detector, 0).unwrap_err();

        assert_eq!(err, DetectionError::Closed);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_close_is_idempotent() {
        let detector = ThreadedTextDetector::new(Box::new(FailingRecognizer)).unwrap();
        assert!(detector.close().is_ok());
        assert!(detector.close().is_ok());
    }

    #[test]
    fn test_close_reports_worker_panic() {
        let detector = ThreadedTextDetector::new(Box::new(PanickingRecognizer)).unwrap();
        detector.submit(image(0), Box::new(|_| {}));

        assert_eq!(detector.close(), Err(DetectionError::WorkerPanicked));
        assert!(detector.close().is_ok());
    }

    #[test]
    fn test_completions_preserve_submission_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let detector = ThreadedTextDetector::with_capacity(
            Box::new(EchoRecognizer {
                calls: calls.clone(),
            }),
            8,
        )
        .unwrap();
        let (tx, rx) = crossbeam_channel::unbounded();

        for i in 0..5 {
            let tx = tx.clone();
            detector.submit(
                image(i),
                Box::new(move |result| {
                    let _ = tx.send(result.map(|t| t.blocks[0].text.clone()));
                }),
            );
        }
        detector.close().unwrap();
        drop(tx);

        let order: Vec<String> = rx.iter().map(|r| r.unwrap()).collect();
        assert_eq!(order, vec!["0", "1", "2", "3", "4"]);
    }
}
