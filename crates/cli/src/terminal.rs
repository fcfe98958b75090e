use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

use cellscope_compute::ScanReport;
use cellscope_core::{BatteryPackSnapshot, Cell, Verdict};
use cellscope_storage::ScanHistoryItem;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const HEADER: Color = Color::Magenta;
    const GOOD: Color = Color::Green;
    const DEGRADED: Color = Color::Yellow;
    const SERVICE: Color = Color::Red;
    const ANOMALY: Color = Color::Red;
    const ADVICE: Color = Color::Cyan;
    const DIM: Color = Color::DarkGrey;
}

fn verdict_color(verdict: Verdict) -> Color {
    match verdict {
        Verdict::Good => Colors::GOOD,
        Verdict::Degraded => Colors::DEGRADED,
        Verdict::ServiceRequired => Colors::SERVICE,
    }
}

fn verdict_text_color(text: &str) -> Color {
    match text {
        "Good" => Colors::GOOD,
        "Degraded" => Colors::DEGRADED,
        _ => Colors::SERVICE,
    }
}

/// One line per flagged cell.
pub fn format_anomaly(cell: &Cell) -> String {
    format!(
        "cell {:>3}  {:.3} V  {:>5.1} mΩ  z={:>6}  {}",
        cell.id,
        cell.voltage,
        cell.internal_resistance * 1000.0,
        cell.z_score.map(|z| format!("{z:.2}")).unwrap_or_else(|| "-".into()),
        cell.anomaly_reason.as_deref().unwrap_or_default(),
    )
}

/// Headline: vehicle, pack readings, verdict.
pub fn format_pack_line(vehicle: &str, snapshot: &BatteryPackSnapshot) -> String {
    format!(
        "{}  {:.2} V  {:.2} A  {:.1} °C  SoC {:.1}%  SoH {:.1}%  {} cycles",
        vehicle,
        snapshot.pack_voltage,
        snapshot.pack_current,
        snapshot.temperature,
        snapshot.state_of_charge,
        snapshot.state_of_health,
        snapshot.cycle_count,
    )
}

/// Colored output for scan reports, history and advice.
#[derive(Default)]
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print one scan: headline, verdict, then flagged cells.
    pub fn print_scan(
        &self,
        n: u32,
        vehicle: &str,
        snapshot: &BatteryPackSnapshot,
        report: &ScanReport,
    ) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("#{n} ")),
            ResetColor,
            Print(format_pack_line(vehicle, snapshot)),
            Print("\n  verdict: "),
            SetForegroundColor(verdict_color(report.verdict)),
            Print(report.verdict.as_str()),
            ResetColor,
            Print(format!(
                "  ({} of {} cells flagged)\n",
                report.anomaly_count(),
                snapshot.cells.len()
            )),
        )?;

        for cell in report.anomalies() {
            execute!(
                stdout,
                SetForegroundColor(Colors::ANOMALY),
                Print(format!("  {}\n", format_anomaly(cell))),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_history(&self, items: &[ScanHistoryItem]) -> Result<()> {
        let mut stdout = io::stdout();
        if items.is_empty() {
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print("No saved scans.\n"),
                ResetColor,
            )?;
            return Ok(());
        }

        for (i, item) in items.iter().enumerate() {
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print(format!("[{i:>2}] {}  ", item.timestamp)),
                ResetColor,
                Print(format!("{:<20} ", item.vehicle)),
                SetForegroundColor(verdict_text_color(&item.verdict_text)),
                Print(format!("{:<16}", item.verdict_text)),
                ResetColor,
                Print(format!("{} anomalies\n", item.anomaly_count)),
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_suggestion(&self, cell: &Cell, vehicle: &str, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("Cell {} on {}\n", cell.id, vehicle)),
            SetForegroundColor(Colors::DIM),
            Print("---\n"),
            SetForegroundColor(Colors::ADVICE),
            Print(text),
            Print("\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_notice(&self, message: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{message}\n")),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}
