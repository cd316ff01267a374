pub mod error;
pub mod types;

pub use error::DomainError;
pub use types::{
    AbrVariant, AvailabilityWindow, ChannelMetadata, ChannelProvisioningRequest,
    ChannelProvisioningResult, ChannelStatus, ContentType, Drm, GeoRestrictions,
    UploadCompletedEvent, UploadEventPayload, Assignable, EVENT_TYPE_MEDIA_UPLOADED,
};
