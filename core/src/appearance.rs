//! Optional styling collaborator used by descriptive patching.

/// A 16-bit-per-channel colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb16 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

pub const FULL_COLOR: u16 = 65535;
pub const HALF_COLOR: u16 = 65535 / 2;

impl Rgb16 {
    pub const INSERTED: Rgb16 = Rgb16 {
        r: HALF_COLOR,
        g: FULL_COLOR,
        b: HALF_COLOR,
    };
    pub const DELETED: Rgb16 = Rgb16 {
        r: FULL_COLOR,
        g: HALF_COLOR,
        b: HALF_COLOR,
    };
    pub const CHANGED: Rgb16 = Rgb16 {
        r: HALF_COLOR,
        g: HALF_COLOR,
        b: FULL_COLOR,
    };
}

/// A partial style; `None` leaves that attribute untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub background: Option<Rgb16>,
    pub bold: Option<bool>,
    pub strikethrough: Option<bool>,
}

impl Style {
    pub fn background(mut self, color: Rgb16) -> Self {
        self.background = Some(color);
        self
    }

    pub fn bold(mut self, on: bool) -> Self {
        self.bold = Some(on);
        self
    }

    pub fn strikethrough(mut self, on: bool) -> Self {
        self.strikethrough = Some(on);
        self
    }
}

/// Receives styling requests for the sheet being patched.
pub trait StyleSink {
    fn style_cell(&mut self, col: u32, row: u32, style: Style);

    fn style_row(&mut self, row: u32, style: Style);

    fn style_column(&mut self, col: u32, style: Style);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTarget {
    Cell { col: u32, row: u32 },
    Row(u32),
    Column(u32),
}

/// Records every styling request in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingStyles {
    pub applied: Vec<(StyleTarget, Style)>,
}

impl RecordingStyles {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StyleSink for RecordingStyles {
    fn style_cell(&mut self, col: u32, row: u32, style: Style) {
        self.applied.push((StyleTarget::Cell { col, row }, style));
    }

    fn style_row(&mut self, row: u32, style: Style) {
        self.applied.push((StyleTarget::Row(row), style));
    }

    fn style_column(&mut self, col: u32, style: Style) {
        self.applied.push((StyleTarget::Column(col), style));
    }
}

impl<S: StyleSink + ?Sized> StyleSink for &mut S {
    fn style_cell(&mut self, col: u32, row: u32, style: Style) {
        (**self).style_cell(col, row, style)
    }

    fn style_row(&mut self, row: u32, style: Style) {
        (**self).style_row(row, style)
    }

    fn style_column(&mut self, col: u32, style: Style) {
        (**self).style_column(col, style)
    }
}
