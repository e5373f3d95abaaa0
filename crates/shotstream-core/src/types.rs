use serde::Deserialize;
use std::fmt;

/// A contiguous slice of the input file, the unit of outbound transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub data: Vec<u8>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Annotation features offered by the streaming endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamingFeature {
    LabelDetection,
    #[default]
    ShotChangeDetection,
    ExplicitContentDetection,
    ObjectTracking,
}

impl fmt::Display for StreamingFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamingFeature::LabelDetection => "label_detection",
            StreamingFeature::ShotChangeDetection => "shot_change_detection",
            StreamingFeature::ExplicitContentDetection => "explicit_content_detection",
            StreamingFeature::ObjectTracking => "object_tracking",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamingConfig {
    pub feature: StreamingFeature,
}

/// One outbound message: the configuration header or a chunk of payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotateRequest {
    Config(StreamingConfig),
    Chunk(Chunk),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TimeOffset {
    pub seconds: i64,
    pub nanos: i32,
}

impl TimeOffset {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + self.nanos as f64 / 1e9
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.as_secs_f64();
        // Integral values keep one decimal place: `0.0`, `4.0`.
        if secs.is_finite() && secs.fract() == 0.0 {
            write!(f, "{secs:.1}")
        } else {
            write!(f, "{secs}")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotAnnotation {
    pub start: TimeOffset,
    pub end: TimeOffset,
}

impl ShotAnnotation {
    pub fn is_well_ordered(&self) -> bool {
        self.start <= self.end
    }
}

impl fmt::Display for ShotAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shot: {}s to {}s", self.start, self.end)
    }
}

/// Annotations delivered by one increment of remote processing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotationResponse {
    pub shots: Vec<ShotAnnotation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub chunks_sent: usize,
    pub bytes_sent: u64,
    pub responses: usize,
    pub annotations: usize,
}
