// This is the models module containing shared data structures
use serde::{Deserialize, Serialize};

// One rendered figure, ready for the display surface
#[derive(Serialize, Deserialize, Clone)]
pub struct FigureData {
    pub title: String, // Display title resolved by the driver
    pub svg: String,   // Complete SVG document for this polygon
    pub width: u32,    // Figure width in pixels
    pub height: u32,   // Figure height in pixels
}

// Everything produced by one upload
#[derive(Serialize, Deserialize)]
pub struct UploadOutcome {
    pub figures: Vec<FigureData>,
    pub error: Option<String>, // User-visible message, e.g. no shapefile in the archive
}

impl UploadOutcome {
    pub fn with_error(message: &str) -> Self {
        UploadOutcome {
            figures: Vec::new(),
            error: Some(message.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct SessionStats {
    pub uploads_processed: usize,
    pub figures_rendered: usize,
    pub last_upload_error: Option<String>,
}
