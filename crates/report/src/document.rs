use std::fs::{self, File};
use std::path::Path;

use docx_rs::{
    AlignmentType, BorderType, Docx, Paragraph, Pic, Run, Table, TableBorder, TableBorderPosition,
    TableBorders, TableCell, TableRow,
};

use crate::{ReportEntry, ReportError, Result};

const LABEL_COLOR: &str = "FF0000";
const LINK_COLOR: &str = "0563C1";
const BORDER_COLOR: &str = "000000";
// eighths of a point
const BORDER_SIZE: usize = 12;

// 3.3in x 2.5in in EMU
const THUMBNAIL_WIDTH_EMU: u32 = 3_017_520;
const THUMBNAIL_HEIGHT_EMU: u32 = 2_286_000;

fn metadata_line(label: &str, value: &str, is_link: bool) -> Paragraph {
    let label = Run::new()
        .add_text(format!("{} ", label))
        .bold()
        .color(LABEL_COLOR);

    let mut value = Run::new().add_text(value);
    if is_link {
        value = value.color(LINK_COLOR).underline("single");
    }

    Paragraph::new().add_run(label).add_run(value)
}

fn entry_table(entry: &ReportEntry) -> Table {
    let cell = TableCell::new()
        .add_paragraph(metadata_line("Title:", &entry.title, false))
        .add_paragraph(metadata_line("Post Date:", &entry.upload_date, false))
        .add_paragraph(metadata_line("Link:", &entry.url, true))
        .add_paragraph(metadata_line("Channel:", &entry.channel, false));

    let borders = [
        TableBorderPosition::Top,
        TableBorderPosition::Left,
        TableBorderPosition::Bottom,
        TableBorderPosition::Right,
    ]
    .into_iter()
    .fold(TableBorders::new(), |borders, position| {
        borders.set(
            TableBorder::new(position)
                .border_type(BorderType::Single)
                .size(BORDER_SIZE)
                .color(BORDER_COLOR),
        )
    });

    Table::new(vec![TableRow::new(vec![cell])]).set_borders(borders)
}

/// Lay out every entry: a bordered metadata box, then its thumbnail
pub fn render_document(entries: &[ReportEntry]) -> Docx {
    let mut docx = Docx::new();

    for entry in entries {
        docx = docx.add_paragraph(Paragraph::new()).add_table(entry_table(entry));

        if let Some(thumbnail) = &entry.thumbnail {
            let pic = Pic::new_with_dimensions(thumbnail.png.clone(), thumbnail.width, thumbnail.height)
                .size(THUMBNAIL_WIDTH_EMU, THUMBNAIL_HEIGHT_EMU);
            docx = docx.add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_image(pic))
                    .align(AlignmentType::Center),
            );
        }
    }

    docx
}

/// Write the report as a .docx file
pub fn write_document(entries: &[ReportEntry], dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(dest)?;
    render_document(entries)
        .build()
        .pack(file)
        .map_err(|e| ReportError::Document(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thumbnail::{tests::sample_png, Thumbnail};

    fn entry(thumbnail: Option<Thumbnail>) -> ReportEntry {
        ReportEntry {
            title: "Morning News".to_string(),
            channel: "News Channel".to_string(),
            upload_date: "31-01-2024".to_string(),
            url: "https://youtu.be/abc".to_string(),
            thumbnail,
        }
    }

    #[test]
    fn writes_a_docx_package() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("report.docx");
        let thumbnail = Thumbnail::from_bytes(&sample_png(16, 9)).unwrap();

        write_document(&[entry(Some(thumbnail)), entry(None)], &dest).unwrap();

        let bytes = fs::read(&dest).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn metadata_box_has_a_heavy_outer_border() {
        use docx_rs::BuildXML;

        let xml = String::from_utf8(entry_table(&entry(None)).build()).unwrap();

        assert!(xml.matches(r#"w:sz="12""#).count() >= 4);
        assert!(xml.contains(r#"w:val="single""#));
    }

    #[test]
    fn empty_report_is_still_a_document() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("empty.docx");

        write_document(&[], &dest).unwrap();
        assert!(dest.exists());
    }
}
