use std::path::Path;

use ndarray::Array3;

use super::error::RoiError;

/// A named region made of one or more integer labels
#[derive(Debug, Clone, PartialEq)]
pub struct Roi {
    pub name: String,
    pub labels: Vec<i64>,
}

impl Roi {
    pub fn new(name: impl Into<String>, labels: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            labels,
        }
    }

    /// Positions of `label_image` carrying any of this ROI's labels
    pub fn mask(&self, label_image: &Array3<f64>) -> Array3<bool> {
        label_image.mapv(|v| self.labels.iter().any(|&l| v == l as f64))
    }
}

/// ROI definitions in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoiLabels {
    rois: Vec<Roi>,
}

impl RoiLabels {
    pub fn new(rois: Vec<Roi>) -> Self {
        let mut labels = Self::default();
        for roi in rois {
            labels.insert(roi);
        }
        labels
    }

    /// Add a ROI; a ROI with the same name is replaced in place
    pub fn insert(&mut self, roi: Roi) {
        match self.rois.iter_mut().find(|r| r.name == roi.name) {
            Some(existing) => {
                tracing::warn!("ROI {} defined more than once, keeping the last", roi.name);
                *existing = roi;
            }
            None => self.rois.push(roi),
        }
    }

    /// Read rows of `name,label,label,...`
    ///
    /// There is no header; empty cells are skipped.
    ///
    /// ```rust,no_run
    /// use petga::roi::RoiLabels;
    ///
    /// // pibindex_Ltemporal,1009,1015,1030,,,
    /// let rois = RoiLabels::from_csv("roi_labels.csv").unwrap();
    /// ```
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, RoiError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| RoiError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, RoiError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut labels = Self::default();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| RoiError::Csv {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            let Some(name) = record.get(0).filter(|n| !n.is_empty()) else {
                continue;
            };
            let values = record
                .iter()
                .skip(1)
                .filter(|cell| !cell.is_empty())
                .map(|cell| {
                    cell.parse::<i64>().map_err(|_| RoiError::InvalidLabel {
                        path: path.to_path_buf(),
                        row: row + 1,
                        value: cell.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            labels.insert(Roi::new(name, values));
        }

        if labels.is_empty() {
            return Err(RoiError::EmptyDefinition {
                path: path.to_path_buf(),
            });
        }
        Ok(labels)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Roi> {
        self.rois.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Roi> {
        self.rois.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.rois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rois.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<RoiLabels, RoiError> {
        RoiLabels::parse(text, Path::new("rois.csv"))
    }

    #[test]
    fn test_parse_trailing_blanks() {
        let rois = parse("pibindex_Ltemporal,1009,1015,1030,,,,\nprecuneus,1025,2025\n").unwrap();
        assert_eq!(rois.len(), 2);
        assert_eq!(rois.get("pibindex_Ltemporal").unwrap().labels, vec![1009, 1015, 1030]);
        assert_eq!(rois.get("precuneus").unwrap().labels, vec![1025, 2025]);
    }

    #[test]
    fn test_invalid_label() {
        let err = parse("a,1\nb,2,x3\n").unwrap_err();
        match err {
            RoiError::InvalidLabel { row, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, "x3");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse("\n"), Err(RoiError::EmptyDefinition { .. })));
    }

    #[test]
    fn test_duplicate_name_keeps_last() {
        let rois = parse("a,1\na,2\n").unwrap();
        assert_eq!(rois.len(), 1);
        assert_eq!(rois.get("a").unwrap().labels, vec![2]);
    }

    #[test]
    fn test_mask_matches_any_label() {
        let image = Array3::from_shape_vec((4, 1, 1), vec![1.0, 2.0, 3.0, 2.5]).unwrap();
        let mask = Roi::new("r", vec![1, 3]).mask(&image);
        assert_eq!(mask.iter().copied().collect::<Vec<_>>(), vec![true, false, true, false]);
    }
}
