use crate::archive::ExtractedArchive;
use crate::figure;
use crate::ingest::{self, FeatureRecord};
use crate::models::UploadOutcome;
use crate::module_state::ModuleState;

// The one locally handled failure: an archive with no shapefile in it
pub const NO_SHAPEFILE_MESSAGE: &str = "No shapefile (.shp) found in the uploaded zip file.";

// Run the whole upload pipeline and record the result in the session stats.
// The no-shapefile case comes back as an outcome carrying the user-visible
// message; every other failure propagates as an error for the caller to
// surface.
pub fn process_upload(data: &[u8]) -> Result<UploadOutcome, String> {
    let result = run_pipeline(data);

    match &result {
        Ok(outcome) => ModuleState::with_mut(|state| {
            state.record_upload(outcome.figures.len(), outcome.error.as_deref())
        }),
        Err(message) => {
            ModuleState::with_mut(|state| state.record_upload(0, Some(message)))
        }
    }

    result
}

fn run_pipeline(data: &[u8]) -> Result<UploadOutcome, String> {
    let archive = ExtractedArchive::from_zip_bytes(data)?;

    let set = match archive.find_shapefile() {
        Some(set) => set,
        None => return Ok(UploadOutcome::with_error(NO_SHAPEFILE_MESSAGE)),
    };

    let records = ingest::extract_feature_records(&set)?;

    // Each part of a multi-polygon gets its own figure, all under the same
    // title
    let mut figures = Vec::new();
    for record in &records {
        let title = display_title(record);
        for polygon in record.geometry.iter() {
            figures.push(figure::render_polygon(polygon, &title));
        }
    }

    Ok(UploadOutcome {
        figures,
        error: None,
    })
}

// Title policy: the attribute verbatim when present, else a positional label
fn display_title(record: &FeatureRecord) -> String {
    match &record.title_attr {
        Some(title) => title.clone(),
        None => format!("Polygon {}", record.position),
    }
}
