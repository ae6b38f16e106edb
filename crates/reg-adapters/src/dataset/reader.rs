//! Dataset en texto delimitado.
//!
//! - Separador: tab, coma o espacios (detectado desde la primera línea).
//! - Encabezado opcional: se asume si alguna celda de la primera línea no
//!   es numérica.
//! - Líneas vacías y las que empiezan con `#` se ignoran.
//! - El target es la última columna salvo que se indique otra por nombre.

use ndarray::{Array1, Array2};
use reg_domain::{Dataset, DomainError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Auto,
    Tab,
    Comma,
    Whitespace,
}

impl Delimiter {
    fn detect(line: &str) -> Self {
        if line.contains('\t') {
            Delimiter::Tab
        } else if line.contains(',') {
            Delimiter::Comma
        } else {
            Delimiter::Whitespace
        }
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Tab => line.split('\t').map(str::trim).collect(),
            Delimiter::Comma => line.split(',').map(str::trim).collect(),
            Delimiter::Whitespace | Delimiter::Auto => line.split_whitespace().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TargetColumn {
    #[default]
    Last,
    Named(String),
}

#[derive(Debug, Clone, Default)]
pub struct DelimitedDatasetReader {
    pub delimiter: Delimiter,
    pub target: TargetColumn,
    /// Centra y escala cada feature a norma unitaria al cargar.
    pub standardize: bool,
}

impl DelimitedDatasetReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standardize(mut self, yes: bool) -> Self {
        self.standardize = yes;
        self
    }

    pub fn target(mut self, target: TargetColumn) -> Self {
        self.target = target;
        self
    }

    pub fn read(&self, bytes: &[u8]) -> Result<Dataset, DomainError> {
        let err = |m: String| DomainError::DatasetError(m);
        let text = std::str::from_utf8(bytes).map_err(|e| err(format!("el archivo no es UTF-8: {e}")))?;
        let mut lines = text.lines()
                            .enumerate()
                            .map(|(i, l)| (i + 1, l.trim()))
                            .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
                            .peekable();

        let (_, first) = *lines.peek().ok_or_else(|| err("archivo vacío".into()))?;
        let delim = match self.delimiter {
            Delimiter::Auto => Delimiter::detect(first),
            d => d,
        };
        let first_cells = delim.split(first);
        let header: Option<Vec<String>> = if first_cells.iter().any(|c| c.parse::<f64>().is_err()) {
            lines.next();
            Some(first_cells.iter().map(|c| c.to_string()).collect())
        } else {
            None
        };
        let width = first_cells.len();
        if width < 2 {
            return Err(err("se necesitan al menos dos columnas (features + target)".into()));
        }
        let target_idx = match &self.target {
            TargetColumn::Last => width - 1,
            TargetColumn::Named(name) => header.as_ref()
                                               .and_then(|h| h.iter().position(|c| c == name))
                                               .ok_or_else(|| err(format!("columna target '{name}' no encontrada")))?,
        };

        let mut flat = Vec::new();
        let mut target = Vec::new();
        for (line_no, line) in lines {
            let cells = delim.split(line);
            if cells.len() != width {
                return Err(err(format!("línea {line_no}: {} columnas, se esperaban {width}", cells.len())));
            }
            for (col, cell) in cells.iter().enumerate() {
                let v: f64 = cell.parse()
                                 .map_err(|_| err(format!("línea {line_no}, columna {}: '{cell}' no es numérico", col + 1)))?;
                if col == target_idx {
                    target.push(v);
                } else {
                    flat.push(v);
                }
            }
        }
        let n = target.len();
        let features = Array2::from_shape_vec((n, width - 1), flat).map_err(|e| err(e.to_string()))?;
        let names = match header {
            Some(h) => h.into_iter()
                        .enumerate()
                        .filter(|(i, _)| *i != target_idx)
                        .map(|(_, name)| name)
                        .collect(),
            None => (0..width - 1).map(|i| format!("x{i}")).collect(),
        };
        let ds = Dataset::new(features, Array1::from_vec(target), names)?;
        if self.standardize {
            ds.standardized()
        } else {
            Ok(ds)
        }
    }
}

/// Serializa con tabs y encabezado; el target va último como `Y`.
pub fn to_delimited(ds: &Dataset) -> String {
    let mut out = ds.feature_names().join("\t");
    out.push_str("\tY\n");
    for (row, y) in ds.features().rows().into_iter().zip(ds.target().iter()) {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        out.push_str(&cells.join("\t"));
        out.push('\t');
        out.push_str(&y.to_string());
        out.push('\n');
    }
    out
}
