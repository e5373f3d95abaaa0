use shotstream_core::{AnnotationResponse, OutputError};

/// Consumer of the inbound half of a streaming session.
///
/// [`handle`](Self::handle) is called once per response, in delivery order;
/// iterating the embedded annotations is up to the implementation.
pub trait ResponseHandler {
    /// Called once, after the call is established and before any response.
    fn on_open(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn handle(&mut self, response: &AnnotationResponse) -> Result<(), OutputError>;
}

impl<F> ResponseHandler for F
where
    F: FnMut(&AnnotationResponse) -> Result<(), OutputError>,
{
    fn handle(&mut self, response: &AnnotationResponse) -> Result<(), OutputError> {
        self(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotstream_core::{ShotAnnotation, TimeOffset};

    #[test]
    fn test_closure_handler_sees_every_response() {
        let mut seen = Vec::new();
        let mut handler = |response: &AnnotationResponse| -> Result<(), OutputError> {
            seen.push(response.shots.len());
            Ok(())
        };

        handler.on_open().unwrap();
        handler
            .handle(&AnnotationResponse {
                shots: vec![ShotAnnotation {
                    start: TimeOffset::new(0, 0),
                    end: TimeOffset::new(1, 0),
                }],
            })
            .unwrap();
        handler.handle(&AnnotationResponse::default()).unwrap();

        assert_eq!(seen, vec![1, 0]);
    }
}
