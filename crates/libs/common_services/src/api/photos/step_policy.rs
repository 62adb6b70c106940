use std::fmt;

/// The steps every upload item goes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStep {
    ValidateId,
    CheckFormat,
    Download,
    Normalize,
    Thumbnail,
    UploadImage,
    UploadThumbnail,
    MergeCatalog,
}

/// What a failing step does to its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Refuse the batch before anything is downloaded or written.
    Reject,
    /// Abort the batch and roll back every item.
    Fatal,
    /// Log it and continue without the step's output.
    BestEffort,
}

impl IngestStep {
    #[must_use]
    pub const fn policy(self) -> StepPolicy {
        match self {
            Self::Thumbnail => StepPolicy::BestEffort,
            Self::ValidateId | Self::CheckFormat => StepPolicy::Reject,
            Self::Download
            | Self::Normalize
            | Self::UploadImage
            | Self::UploadThumbnail
            | Self::MergeCatalog => StepPolicy::Fatal,
        }
    }
}

impl fmt::Display for IngestStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ValidateId => "validate id",
            Self::CheckFormat => "check format",
            Self::Download => "download",
            Self::Normalize => "normalize",
            Self::Thumbnail => "thumbnail",
            Self::UploadImage => "upload image",
            Self::UploadThumbnail => "upload thumbnail",
            Self::MergeCatalog => "merge catalog",
        };
        f.write_str(name)
    }
}
