/// Where a row's media comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A file that already exists on this machine
    Local,
    /// Anything else: a URL or video id handed to the downloader
    Remote,
}

/// One timecode column of a row: the header it sits under and the raw cell text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRangeCell {
    pub column_label: String,
    pub raw_text: String,
}

impl TimeRangeCell {
    pub fn new(column_label: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            column_label: column_label.into(),
            raw_text: raw_text.into(),
        }
    }
}

/// A single video to cut, as read from one row of the input table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub source_identifier: String,
    pub kind: SourceKind,
    pub display_channel: Option<String>,
    pub time_range_cells: Vec<TimeRangeCell>,
}

impl SourceRow {
    /// Build a typed row from the table's headers and one row of cell text.
    ///
    /// Column layout depends on the source kind: local files carry a
    /// channel override in the second column and their timecodes start in
    /// the third, remote sources have timecodes from the second column on.
    pub fn from_cells(headers: &[String], cells: &[String], kind: SourceKind) -> Self {
        let cell = |i: usize| cells.get(i).map(|c| c.trim()).unwrap_or_default();

        let source_identifier = cell(0).to_string();

        let (display_channel, first_range_column) = match kind {
            SourceKind::Local => {
                let channel = cell(1);
                let channel = (!channel.is_empty()).then(|| channel.to_string());
                (channel, 2)
            }
            SourceKind::Remote => (None, 1),
        };

        let time_range_cells = headers
            .iter()
            .enumerate()
            .skip(first_range_column)
            .map(|(i, header)| TimeRangeCell::new(header.clone(), cell(i)))
            .collect();

        Self {
            source_identifier,
            kind,
            display_channel,
            time_range_cells,
        }
    }

    /// Rows without an identifier are never processed
    pub fn is_blank(&self) -> bool {
        self.source_identifier.is_empty()
    }
}

/// What the resolver learned about a source before any download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub title: String,
    pub channel: String,
    /// Whole seconds; `None` when the source cannot report it up front
    pub duration: Option<u64>,
}
