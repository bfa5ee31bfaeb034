//! Status display (SH1107 128×64 OLED).
//!
//! The core only decides *what* to draw; the [`DisplayPort`] adapter owns
//! the panel.  Two pages are available and are cycled from the keypad:
//!
//! - **Climate**: fixed-scale temperature graph with axis ticks, the last
//!   reported and current temperature, and a trace of recent samples.
//! - **Status**: window position, rain state and the sensing toggle.
//!
//! Redraws are rate-limited and skipped when nothing visible changed.

use core::fmt::Write as _;

use heapless::{HistoryBuffer, String};

use crate::app::ports::DisplayPort;
use crate::app::state::DeviceState;
use crate::interval::IntervalGate;

pub const SCREEN_WIDTH: u8 = 128;
pub const SCREEN_HEIGHT: u8 = 64;

/// Left edge of the plotting area (the vertical axis).
const GRAPH_X: u8 = 7;
/// Horizontal spacing between plotted samples.
const GRAPH_STEP: u8 = 5;
/// Samples kept for the trace (fills the plot width).
pub const HISTORY_LEN: usize = 24;
/// Fixed vertical scale of the graph (°C at bottom / top).
const GRAPH_MIN_C: f32 = 0.0;
const GRAPH_MAX_C: f32 = 40.0;

/// CP437 up-arrow, used as the y-axis label.
const GLYPH_UP_ARROW: u8 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Climate,
    Status,
}

impl Page {
    pub fn next(self) -> Self {
        match self {
            Self::Climate => Self::Status,
            Self::Status => Self::Climate,
        }
    }

    pub fn previous(self) -> Self {
        // Two pages: previous and next coincide.
        self.next()
    }
}

/// Everything visible on screen.  Compared against the last frame to skip
/// redundant redraws.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frame {
    page: Page,
    last_reported_c: Option<f32>,
    current_c: Option<f32>,
    current_rh: Option<f32>,
    /// Samples ever pushed; the trace shifts even once the buffer is full.
    samples_pushed: u32,
    window_open: bool,
    wet: Option<bool>,
    sensing: bool,
}

pub struct DisplayRenderer {
    gate: IntervalGate,
    page: Page,
    history: HistoryBuffer<f32, HISTORY_LEN>,
    samples_pushed: u32,
    last_frame: Option<Frame>,
}

impl DisplayRenderer {
    pub fn new(refresh_interval_ms: u32, now_ms: u32) -> Self {
        Self {
            gate: IntervalGate::primed(refresh_interval_ms, now_ms),
            page: Page::default(),
            history: HistoryBuffer::new(),
            samples_pushed: 0,
            last_frame: None,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn set_page(&mut self, page: Page) {
        self.page = page;
    }

    /// Append a temperature sample to the graph trace.
    pub fn push_sample(&mut self, temperature_c: f32) {
        self.history.write(temperature_c);
        self.samples_pushed = self.samples_pushed.wrapping_add(1);
    }

    /// Redraw if the refresh interval elapsed and the content changed.
    /// Returns `true` when a frame was pushed to the panel.
    pub fn refresh(
        &mut self,
        now_ms: u32,
        state: &DeviceState,
        display: &mut impl DisplayPort,
    ) -> bool {
        if !self.gate.poll(now_ms) {
            return false;
        }

        let frame = Frame {
            page: self.page,
            last_reported_c: state.last_reported.map(|r| r.temperature_c),
            current_c: state.current.map(|r| r.temperature_c),
            current_rh: state.current.map(|r| r.humidity_pct),
            samples_pushed: self.samples_pushed,
            window_open: state.window == crate::decision::WindowState::Open,
            wet: state.rain.map(|r| r.is_wet),
            sensing: state.sensing_enabled(),
        };
        if self.last_frame == Some(frame) {
            return false;
        }

        display.clear();
        match frame.page {
            Page::Climate => self.draw_climate_page(&frame, display),
            Page::Status => draw_status_page(&frame, display),
        }
        display.flush();

        self.last_frame = Some(frame);
        true
    }

    fn draw_climate_page(&self, frame: &Frame, display: &mut impl DisplayPort) {
        draw_graph_grid(display);

        display.set_cursor(9, 0);
        display.print(&format_temperature("Temp:", frame.last_reported_c));
        display.set_cursor(73, 0);
        display.print(&format_temperature("Cur:", frame.current_c));

        display.set_cursor(0, 0);
        display.write_glyph(GLYPH_UP_ARROW);
        display.set_cursor(0, 8);
        display.print("T");

        for (i, &t) in self.history.oldest_ordered().enumerate() {
            let x = GRAPH_X + 1 + (i as u8) * GRAPH_STEP;
            display.draw_pixel(x, temperature_to_y(t));
        }
    }
}

/// Axis ticks, a dotted reference line at the lower quarter, and both axes.
fn draw_graph_grid(display: &mut impl DisplayPort) {
    for i in 1..4 {
        display.draw_pixel(6, SCREEN_HEIGHT - SCREEN_HEIGHT / 4 * i);
    }
    for x in [27, 47, 67, 87, 107] {
        display.draw_pixel(x, 62);
    }
    for x in (GRAPH_X..SCREEN_WIDTH).step_by(usize::from(GRAPH_STEP)) {
        display.draw_pixel(x, SCREEN_HEIGHT - SCREEN_HEIGHT / 4);
    }
    display.draw_vline(GRAPH_X, 0, 63);
    display.draw_hline(GRAPH_X, 63, 120);
}

fn draw_status_page(frame: &Frame, display: &mut impl DisplayPort) {
    let mut line: String<24> = String::new();

    display.set_cursor(0, 0);
    display.print(if frame.window_open { "Window: OPEN" } else { "Window: CLOSED" });

    display.set_cursor(0, 12);
    display.print(match frame.wet {
        Some(true) => "Rain: WET",
        Some(false) => "Rain: dry",
        None => "Rain: --",
    });

    display.set_cursor(0, 24);
    match frame.current_rh {
        Some(rh) => {
            let _ = write!(line, "Humidity: {:.1}%", rh);
            display.print(&line);
        }
        None => display.print("Humidity: --"),
    }

    display.set_cursor(0, 36);
    display.print(if frame.sensing { "Sensing: on" } else { "Sensing: off" });
}

/// `"<label>21.3C"`, or `"<label>--"` before the first reading.
fn format_temperature(label: &str, value: Option<f32>) -> String<16> {
    let mut s = String::new();
    let _ = match value {
        Some(t) => write!(s, "{}{:.1}C", label, t),
        None => write!(s, "{}--", label),
    };
    s
}

/// Map a temperature onto the plot area (row 0 = top, 62 = just above axis).
fn temperature_to_y(t: f32) -> u8 {
    let span = GRAPH_MAX_C - GRAPH_MIN_C;
    let frac = ((t - GRAPH_MIN_C) / span).clamp(0.0, 1.0);
    62 - (frac * 62.0) as u8
}
