//! Wire messages of `google.cloud.videointelligence.v1p3beta1` used by the
//! streaming annotate call. Only the fields this client reads or writes are
//! declared; prost skips the rest on decode.

use shotstream_core::{
    AnnotateRequest, AnnotationResponse, ShotAnnotation, StreamingConfig, TimeOffset,
    TransportError,
};

pub const STREAMING_ANNOTATE_VIDEO_PATH: &str =
    "/google.cloud.videointelligence.v1p3beta1.StreamingVideoIntelligenceService/StreamingAnnotateVideo";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingAnnotateVideoRequest {
    #[prost(
        oneof = "streaming_annotate_video_request::StreamingRequest",
        tags = "1, 2"
    )]
    pub streaming_request:
        ::core::option::Option<streaming_annotate_video_request::StreamingRequest>,
}
/// Nested message and enum types in `StreamingAnnotateVideoRequest`.
pub mod streaming_annotate_video_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum StreamingRequest {
        /// Must be the first message of the stream.
        #[prost(message, tag = "1")]
        VideoConfig(super::StreamingVideoConfig),
        #[prost(bytes = "vec", tag = "2")]
        InputContent(::prost::alloc::vec::Vec<u8>),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingVideoConfig {
    #[prost(enumeration = "StreamingFeature", tag = "1")]
    pub feature: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum StreamingFeature {
    Unspecified = 0,
    StreamingLabelDetection = 1,
    StreamingShotChangeDetection = 2,
    StreamingExplicitContentDetection = 3,
    StreamingObjectTracking = 4,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingAnnotateVideoResponse {
    /// Set when the service failed on this increment.
    #[prost(message, optional, tag = "1")]
    pub error: ::core::option::Option<RpcStatus>,
    #[prost(message, optional, tag = "2")]
    pub annotation_results: ::core::option::Option<StreamingVideoAnnotationResults>,
    #[prost(string, tag = "3")]
    pub annotation_results_uri: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingVideoAnnotationResults {
    #[prost(message, repeated, tag = "1")]
    pub shot_annotations: ::prost::alloc::vec::Vec<VideoSegment>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VideoSegment {
    #[prost(message, optional, tag = "1")]
    pub start_time_offset: ::core::option::Option<::prost_types::Duration>,
    #[prost(message, optional, tag = "2")]
    pub end_time_offset: ::core::option::Option<::prost_types::Duration>,
}

/// `google.rpc.Status`, without `details`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpcStatus {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}

impl From<shotstream_core::StreamingFeature> for StreamingFeature {
    fn from(feature: shotstream_core::StreamingFeature) -> Self {
        use shotstream_core::StreamingFeature as F;
        match feature {
            F::LabelDetection => StreamingFeature::StreamingLabelDetection,
            F::ShotChangeDetection => StreamingFeature::StreamingShotChangeDetection,
            F::ExplicitContentDetection => StreamingFeature::StreamingExplicitContentDetection,
            F::ObjectTracking => StreamingFeature::StreamingObjectTracking,
        }
    }
}

impl From<StreamingConfig> for StreamingVideoConfig {
    fn from(config: StreamingConfig) -> Self {
        Self {
            feature: StreamingFeature::from(config.feature) as i32,
        }
    }
}

impl From<AnnotateRequest> for StreamingAnnotateVideoRequest {
    fn from(request: AnnotateRequest) -> Self {
        use streaming_annotate_video_request::StreamingRequest;
        let streaming_request = match request {
            AnnotateRequest::Config(config) => StreamingRequest::VideoConfig(config.into()),
            AnnotateRequest::Chunk(chunk) => StreamingRequest::InputContent(chunk.into_bytes()),
        };
        Self {
            streaming_request: Some(streaming_request),
        }
    }
}

fn time_offset(duration: Option<::prost_types::Duration>) -> TimeOffset {
    duration
        .map(|d| TimeOffset::new(d.seconds, d.nanos))
        .unwrap_or_default()
}

impl StreamingAnnotateVideoResponse {
    /// Convert into the domain response; an in-band error status fails the call.
    pub fn into_annotation_response(self) -> Result<AnnotationResponse, TransportError> {
        if let Some(status) = self.error.filter(|s| s.code != 0) {
            return Err(TransportError::Service {
                code: status.code,
                message: status.message,
            });
        }

        let shots = self
            .annotation_results
            .map(|results| {
                results
                    .shot_annotations
                    .into_iter()
                    .map(|segment| ShotAnnotation {
                        start: time_offset(segment.start_time_offset),
                        end: time_offset(segment.end_time_offset),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(AnnotationResponse { shots })
    }
}
