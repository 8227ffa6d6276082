use std::io::Cursor;

use geo_types::MultiPolygon;
use shapefile::{dbase, Shape, ShapeReader};

use crate::archive::ShapefileSet;
use crate::reproject;

// Attribute column carrying the holder name used as the figure title
pub const TITLE_FIELD: &str = "Bhugwatdar";

// One parsed shapefile record, already reprojected to the target zone.
// Plain polygons arrive as one-element multi-polygons.
pub struct FeatureRecord {
    pub geometry: MultiPolygon<f64>,
    pub title_attr: Option<String>,
    pub position: usize, // 1-indexed record order, non-polygon records included
}

// Parse the shapefile set into feature records and reproject them. Shapes
// that are not polygons keep their slot in the record order but produce no
// feature.
pub fn extract_feature_records(set: &ShapefileSet) -> Result<Vec<FeatureRecord>, String> {
    let mut reader = ShapeReader::new(Cursor::new(set.shp.as_slice()))
        .map_err(|e| format!("Failed to open shapefile '{}': {}", set.shp_name, e))?;

    let mut shapes = Vec::new();
    for shape in reader.iter_shapes() {
        shapes.push(
            shape.map_err(|e| format!("Failed to parse shapefile '{}': {}", set.shp_name, e))?,
        );
    }

    let attributes = match &set.dbf {
        Some(bytes) => read_attribute_records(bytes)?,
        None => Vec::new(),
    };

    let mut records = Vec::with_capacity(shapes.len());
    for (index, shape) in shapes.into_iter().enumerate() {
        let polygon = match shape {
            Shape::Polygon(polygon) => polygon,
            // Points and polylines have no layout to draw
            _ => continue,
        };

        let geometry: MultiPolygon<f64> = polygon.into();
        records.push(FeatureRecord {
            geometry: reproject::reproject_multi_polygon(&geometry),
            title_attr: attributes.get(index).and_then(title_attribute),
            position: index + 1,
        });
    }

    Ok(records)
}

// Read the companion .dbf table into attribute records
fn read_attribute_records(bytes: &[u8]) -> Result<Vec<dbase::Record>, String> {
    let mut reader = dbase::Reader::new(Cursor::new(bytes))
        .map_err(|e| format!("Failed to open attribute table: {}", e))?;

    let mut records = Vec::new();
    for record in reader.iter_records() {
        records.push(record.map_err(|e| format!("Failed to read attribute record: {}", e))?);
    }
    Ok(records)
}

// The title attribute counts only when present and non-blank
fn title_attribute(record: &dbase::Record) -> Option<String> {
    match record.get(TITLE_FIELD) {
        Some(dbase::FieldValue::Character(Some(value))) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapefile::dbase::{FieldName, FieldValue, Record as DbfRecord, TableWriterBuilder};
    use shapefile::{Point, Polygon, PolygonRing, ShapeWriter};

    // A small quadrilateral near the middle of UTM zone 33
    fn zone33_square(lng: f64, lat: f64, size: f64) -> Polygon {
        Polygon::new(PolygonRing::Outer(vec![
            Point::new(lng, lat),
            Point::new(lng + size, lat),
            Point::new(lng + size, lat + size),
            Point::new(lng, lat + size),
            Point::new(lng, lat),
        ]))
    }

    fn shp_bytes(polygons: &[Polygon]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let writer = ShapeWriter::new(&mut cursor);
        writer.write_shapes(polygons).unwrap();
        cursor.into_inner()
    }

    fn dbf_bytes(titles: &[Option<&str>]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let writer = TableWriterBuilder::new()
            .add_character_field(FieldName::try_from(TITLE_FIELD).unwrap(), 50)
            .build_with_dest(&mut cursor);

        let records: Vec<DbfRecord> = titles
            .iter()
            .map(|title| {
                let mut record = DbfRecord::default();
                record.insert(
                    TITLE_FIELD.to_string(),
                    FieldValue::Character(title.map(|t| t.to_string())),
                );
                record
            })
            .collect();
        writer.write_records(&records).unwrap();
        cursor.into_inner()
    }

    fn set_from(shp: Vec<u8>, dbf: Option<Vec<u8>>) -> ShapefileSet {
        ShapefileSet {
            shp_name: "parcels.shp".to_string(),
            shp,
            dbf,
        }
    }

    #[test]
    fn polygons_are_parsed_and_reprojected() {
        let set = set_from(shp_bytes(&[zone33_square(15.0, 47.0, 0.01)]), None);

        let records = extract_feature_records(&set).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].position, 1);
        assert!(records[0].title_attr.is_none());

        // Coordinates must come out in projected meters, not degrees
        let exterior = records[0].geometry.0[0].exterior();
        for coord in exterior.coords() {
            assert!(coord.x > 400_000.0 && coord.x < 600_000.0);
            assert!(coord.y > 5_000_000.0 && coord.y < 5_400_000.0);
        }
    }

    #[test]
    fn title_attribute_is_read_from_the_companion_table() {
        let shp = shp_bytes(&[
            zone33_square(15.0, 47.0, 0.01),
            zone33_square(15.1, 47.1, 0.01),
            zone33_square(15.2, 47.2, 0.01),
        ]);
        let dbf = dbf_bytes(&[Some("Khasra 12"), Some("   "), None]);
        let set = set_from(shp, Some(dbf));

        let records = extract_feature_records(&set).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].title_attr.as_deref(), Some("Khasra 12"));
        assert!(records[1].title_attr.is_none(), "blank titles do not count");
        assert!(records[2].title_attr.is_none());
    }

    #[test]
    fn non_polygon_shapefiles_yield_no_records() {
        let mut cursor = Cursor::new(Vec::new());
        let writer = ShapeWriter::new(&mut cursor);
        let polyline = shapefile::Polyline::new(vec![
            Point::new(15.0, 47.0),
            Point::new(15.1, 47.1),
        ]);
        writer.write_shapes(&[polyline]).unwrap();

        let set = set_from(cursor.into_inner(), None);
        let records = extract_feature_records(&set).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn corrupt_shapefile_bytes_are_an_error() {
        let set = set_from(b"not a shapefile".to_vec(), None);
        assert!(extract_feature_records(&set).is_err());
    }

    #[test]
    fn two_outer_rings_become_a_two_part_multi_polygon() {
        let polygon = Polygon::with_rings(vec![
            PolygonRing::Outer(vec![
                Point::new(15.0, 47.0),
                Point::new(15.01, 47.0),
                Point::new(15.01, 47.01),
                Point::new(15.0, 47.01),
                Point::new(15.0, 47.0),
            ]),
            PolygonRing::Outer(vec![
                Point::new(15.1, 47.1),
                Point::new(15.11, 47.1),
                Point::new(15.11, 47.11),
                Point::new(15.1, 47.11),
                Point::new(15.1, 47.1),
            ]),
        ]);
        let set = set_from(shp_bytes(&[polygon]), None);

        let records = extract_feature_records(&set).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].geometry.0.len(), 2);
    }
}
