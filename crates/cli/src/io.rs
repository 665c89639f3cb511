//! Site files: CSV and Parquet through polars, plain whitespace text otherwise.
//!
//! Tabular inputs need numeric columns `x` and `y` (integers are cast). Text
//! inputs carry one `x y` pair per line; blank lines and `#` comments are skipped.

use anyhow::{anyhow, bail, Context, Result};
use nalgebra::Vector2;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiteFormat {
    Csv,
    Parquet,
    Text,
}

impl SiteFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(e) if e.eq_ignore_ascii_case("csv") => SiteFormat::Csv,
            Some(e) if e.eq_ignore_ascii_case("parquet") => SiteFormat::Parquet,
            _ => SiteFormat::Text,
        }
    }
}

pub fn read_sites(path: &Path) -> Result<Vec<Vector2<f64>>> {
    let sites = match SiteFormat::from_path(path) {
        SiteFormat::Csv => {
            let lf = LazyCsvReader::new(path)
                .with_has_header(true)
                .with_infer_schema_length(Some(100))
                .finish()
                .with_context(|| format!("opening {}", path.display()))?;
            sites_from_lazy(lf)?
        }
        SiteFormat::Parquet => {
            let lf = LazyFrame::scan_parquet(path, ScanArgsParquet::default())
                .with_context(|| format!("opening {}", path.display()))?;
            sites_from_lazy(lf)?
        }
        SiteFormat::Text => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_text(&text)?
        }
    };
    tracing::info!(path = %path.display(), sites = sites.len(), "read sites");
    Ok(sites)
}

fn sites_from_lazy(lf: LazyFrame) -> Result<Vec<Vector2<f64>>> {
    let df = lf
        .select([
            col("x").cast(DataType::Float64),
            col("y").cast(DataType::Float64),
        ])
        .collect()?;
    sites_from_frame(&df)
}

/// Sites from the `x`, `y` columns of a frame; nulls are rejected.
pub fn sites_from_frame(df: &DataFrame) -> Result<Vec<Vector2<f64>>> {
    let xs = df.column("x")?.f64()?;
    let ys = df.column("y")?.f64()?;
    xs.into_iter()
        .zip(ys.into_iter())
        .enumerate()
        .map(|(row, (x, y))| match (x, y) {
            (Some(x), Some(y)) => Ok(Vector2::new(x, y)),
            _ => Err(anyhow!("row {row}: missing coordinate")),
        })
        .collect()
}

pub fn parse_text(text: &str) -> Result<Vec<Vector2<f64>>> {
    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|f| !f.is_empty())
            .collect();
        if fields.len() != 2 {
            bail!("line {}: expected `x y`, got {:?}", lineno + 1, line);
        }
        let x: f64 = fields[0]
            .parse()
            .with_context(|| format!("line {}: bad x {:?}", lineno + 1, fields[0]))?;
        let y: f64 = fields[1]
            .parse()
            .with_context(|| format!("line {}: bad y {:?}", lineno + 1, fields[1]))?;
        out.push(Vector2::new(x, y));
    }
    Ok(out)
}

/// Write sites as an `x,y` table (CSV or Parquet by extension; text otherwise).
pub fn write_sites(path: &Path, sites: &[Vector2<f64>]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let xs: Vec<f64> = sites.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = sites.iter().map(|p| p.y).collect();
    match SiteFormat::from_path(path) {
        SiteFormat::Csv => {
            let mut df = df!("x" => xs, "y" => ys)?;
            let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
        }
        SiteFormat::Parquet => {
            let mut df = df!("x" => xs, "y" => ys)?;
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            ParquetWriter::new(file).finish(&mut df)?;
        }
        SiteFormat::Text => {
            let body: String = sites.iter().map(|p| format!("{} {}\n", p.x, p.y)).collect();
            std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
        }
    }
    tracing::info!(path = %path.display(), sites = sites.len(), "wrote sites");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn format_from_extension() {
        assert_eq!(SiteFormat::from_path(Path::new("a/b.CSV")), SiteFormat::Csv);
        assert_eq!(SiteFormat::from_path(Path::new("b.parquet")), SiteFormat::Parquet);
        assert_eq!(SiteFormat::from_path(Path::new("b.txt")), SiteFormat::Text);
        assert_eq!(SiteFormat::from_path(Path::new("noext")), SiteFormat::Text);
    }

    #[test]
    fn text_skips_comments_and_blank_lines() {
        let sites = parse_text("# header\n0 0\n\n4.5, 0   # trailing\n 2\t4\n").unwrap();
        assert_eq!(
            sites,
            vec![Vector2::new(0.0, 0.0), Vector2::new(4.5, 0.0), Vector2::new(2.0, 4.0)]
        );
    }

    #[test]
    fn text_rejects_bad_lines() {
        let err = parse_text("1 2\n3\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
        assert!(parse_text("1 abc\n").is_err());
    }

    #[test]
    fn frame_with_null_is_rejected() {
        let df = df!("x" => [Some(1.0), None], "y" => [Some(2.0), Some(3.0)]).unwrap();
        let err = sites_from_frame(&df).unwrap_err();
        assert!(err.to_string().contains("row 1"), "{err}");
    }

    #[test]
    fn csv_integer_columns_are_cast() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sites.csv");
        std::fs::write(&path, "x,y,label\n0,0,a\n4,0,b\n2,4,c\n").unwrap();
        let sites = read_sites(&path).unwrap();
        assert_eq!(sites.len(), 3);
        assert_eq!(sites[2], Vector2::new(2.0, 4.0));
    }

    #[test]
    fn written_csv_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/gen.csv");
        let sites = vec![Vector2::new(0.25, -1.5), Vector2::new(3.0, 7.125)];
        write_sites(&path, &sites).unwrap();
        assert_eq!(read_sites(&path).unwrap(), sites);
    }

    #[test]
    fn written_text_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gen.txt");
        let sites = vec![Vector2::new(1.0, 2.0), Vector2::new(-3.5, 0.0)];
        write_sites(&path, &sites).unwrap();
        assert_eq!(read_sites(&path).unwrap(), sites);
    }
}
