use std::{fs, path::Path};

use tracing::info;

use crate::{error::Result, model::ProductRecord};

const HEADER: [&str; 6] = [
    "Category",
    "name",
    "subtitle",
    "price",
    "discount_price",
    "main_image_url",
];
const SECONDARY_HEADER: &str = "secondary_image_url";

impl ProductRecord {
    fn to_csv_record(&self, with_secondary: bool) -> Vec<&str> {
        let mut row = vec![
            self.category.as_str(),
            self.name.as_deref().unwrap_or_default(),
            self.subtitle.as_deref().unwrap_or_default(),
            self.price.as_deref().unwrap_or_default(),
            self.discount_price.as_deref().unwrap_or_default(),
            self.main_image_url.as_deref().unwrap_or_default(),
        ];
        if with_secondary {
            row.push(self.secondary_image_url.as_deref().unwrap_or_default());
        }
        row
    }
}

/// Writes the result table to `path`, replacing whatever was there.
///
/// Absent fields become empty cells. The `secondary_image_url` column is
/// only written when `with_secondary` is set.
pub fn write_table(records: &[ProductRecord], path: &Path, with_secondary: bool) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    let mut header = HEADER.to_vec();
    if with_secondary {
        header.push(SECONDARY_HEADER);
    }
    writer.write_record(&header)?;

    for record in records {
        writer.write_record(record.to_csv_record(with_secondary))?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = records.len(), "wrote product table");
    Ok(())
}

/// Reads a table written by [`write_table`]. Empty cells come back as `None`.
pub fn read_table(path: &Path) -> Result<Vec<ProductRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<ProductRecord>, _>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frozen(name: &str, discount: Option<&str>) -> ProductRecord {
        ProductRecord {
            name: Some(name.to_string()),
            subtitle: Some("Paquete 400 g".to_string()),
            price: Some("2,35 €".to_string()),
            discount_price: discount.map(str::to_string),
            main_image_url: Some(format!("https://img.test/{name}.jpg")),
            ..ProductRecord::new("Frozen")
        }
    }

    #[test]
    fn test_columns_and_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw/products.csv");

        write_table(
            &[frozen("Guisantes", Some("1,99 €")), frozen("Espinacas", None)],
            &path,
            false,
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "Category,name,subtitle,price,discount_price,main_image_url"
        );
        assert_eq!(
            lines[2],
            "Frozen,Espinacas,Paquete 400 g,\"2,35 €\",,https://img.test/Espinacas.jpg"
        );
    }

    #[test]
    fn test_secondary_column_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        let mut first = frozen("Guisantes", Some("1,99 €"));
        first.secondary_image_url = Some("https://img.test/Guisantes-2.jpg".to_string());
        let records = vec![first, frozen("Espinacas", None)];

        write_table(&records, &path, true).unwrap();

        let header = fs::read_to_string(&path).unwrap();
        assert!(header.lines().next().unwrap().ends_with(",secondary_image_url"));
        assert_eq!(read_table(&path).unwrap(), records);
    }

    #[test]
    fn test_overwrites_previous_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");

        write_table(&[frozen("A", None), frozen("B", None)], &path, false).unwrap();
        write_table(&[frozen("C", None)], &path, false).unwrap();

        let records = read_table(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("C"));
        assert_eq!(records[0].secondary_image_url, None);
    }
}
