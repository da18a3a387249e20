use std::io::Write;

use search_stream_client::{HtmlView, ResultsView, TerminalView};

/// Output a view still owes the process once input is handled or a search ends.
///
/// `TerminalView` writes as it goes; `HtmlView` buffers and is printed here.
pub trait Emit: ResultsView {
    fn emit_alerts(&mut self) {}

    fn emit_results(&mut self) {}
}

impl<W: Write, A: Write> Emit for TerminalView<W, A> {}

impl Emit for HtmlView {
    fn emit_alerts(&mut self) {
        for alert in self.take_alerts() {
            eprintln!("⚠️  {alert}");
        }
    }

    fn emit_results(&mut self) {
        if !self.blocks().is_empty() {
            println!("{}", self.to_html());
        }
    }
}
