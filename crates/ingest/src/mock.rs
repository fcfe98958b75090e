//! Simulated pack telemetry.
//!
//! Healthy cells sit around 3.7 V / 2 mΩ with uniform noise. Three cells are
//! pinned as faults: one low-voltage, one high-voltage and one
//! high-resistance cell.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cellscope_core::{BatteryPackSnapshot, Cell, CellId};

pub const DEFAULT_CELL_COUNT: u32 = 96;

const NORMAL_VOLTAGE: f64 = 3.7;
const VOLTAGE_NOISE: f64 = 0.015;
const NORMAL_RESISTANCE: f64 = 0.002;
const RESISTANCE_NOISE: f64 = 0.0005;

const LOW_VOLTAGE_CELL: CellId = 15;
const HIGH_VOLTAGE_CELL: CellId = 78;
const HIGH_RESISTANCE_CELL: CellId = 52;

const LOW_VOLTAGE: f64 = 3.55;
const HIGH_VOLTAGE: f64 = 3.82;
const HIGH_RESISTANCE: f64 = 0.015;

/// mAh.
const DESIGN_CAPACITY: f64 = 4000.0;
/// mAh.
const FULL_CHARGE_CAPACITY: f64 = 3650.0;
const CYCLE_COUNT: u32 = 312;

/// Anything that can produce pack snapshots on demand.
pub trait TelemetrySource {
    fn next_snapshot(&mut self) -> BatteryPackSnapshot;
}

/// Cell count and which ids carry injected faults.
#[derive(Debug, Clone, PartialEq)]
pub struct PackLayout {
    pub cell_count: u32,
    pub low_voltage_cell: Option<CellId>,
    pub high_voltage_cell: Option<CellId>,
    pub high_resistance_cell: Option<CellId>,
}

impl PackLayout {
    /// Layout with the standard fault cells; faults outside `1..=cell_count` are dropped.
    pub fn with_cells(cell_count: u32) -> Self {
        let cell_count = cell_count.max(1);
        let within = |id: CellId| (id <= cell_count).then_some(id);
        Self {
            cell_count,
            low_voltage_cell: within(LOW_VOLTAGE_CELL),
            high_voltage_cell: within(HIGH_VOLTAGE_CELL),
            high_resistance_cell: within(HIGH_RESISTANCE_CELL),
        }
    }

    /// Same cell count, no injected faults.
    pub fn healthy(cell_count: u32) -> Self {
        Self {
            cell_count: cell_count.max(1),
            low_voltage_cell: None,
            high_voltage_cell: None,
            high_resistance_cell: None,
        }
    }
}

impl Default for PackLayout {
    fn default() -> Self {
        Self::with_cells(DEFAULT_CELL_COUNT)
    }
}

/// Random pack generator.
#[derive(Debug, Clone)]
pub struct MockBatteryGenerator<R = StdRng> {
    layout: PackLayout,
    rng: R,
}

impl MockBatteryGenerator {
    pub fn seeded(layout: PackLayout, seed: u64) -> Self {
        Self::new(layout, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(layout: PackLayout) -> Self {
        Self::new(layout, StdRng::from_entropy())
    }

    pub fn from_seed(layout: PackLayout, seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(layout, seed),
            None => Self::from_entropy(layout),
        }
    }
}

impl<R: Rng> MockBatteryGenerator<R> {
    pub fn new(layout: PackLayout, rng: R) -> Self {
        Self { layout, rng }
    }

    /// Symmetric noise in `[-amplitude, amplitude)`.
    fn noise(&mut self, amplitude: f64) -> f64 {
        (self.rng.gen::<f64>() - 0.5) * 2.0 * amplitude
    }

    fn generate_cell(&mut self, id: CellId) -> Cell {
        let mut voltage = NORMAL_VOLTAGE + self.noise(VOLTAGE_NOISE);
        let mut internal_resistance = NORMAL_RESISTANCE + self.noise(RESISTANCE_NOISE);

        // Faulty cells get half the noise band around their fault value.
        if Some(id) == self.layout.low_voltage_cell {
            voltage = LOW_VOLTAGE + self.noise(VOLTAGE_NOISE / 2.0);
        } else if Some(id) == self.layout.high_voltage_cell {
            voltage = HIGH_VOLTAGE + self.noise(VOLTAGE_NOISE / 2.0);
        } else if Some(id) == self.layout.high_resistance_cell {
            internal_resistance = HIGH_RESISTANCE + self.noise(RESISTANCE_NOISE / 2.0);
        }

        Cell::new(id, round_to(voltage, 3), round_to(internal_resistance, 4))
    }

    pub fn generate(&mut self) -> BatteryPackSnapshot {
        let cells: Vec<Cell> = (1..=self.layout.cell_count)
            .map(|id| self.generate_cell(id))
            .collect();

        // Simplified series voltage: four parallel cells per series group.
        let series_groups = self.layout.cell_count as f64 / 4.0;
        let pack_voltage = cells.iter().map(|c| c.voltage).sum::<f64>() / series_groups;
        let state_of_health = FULL_CHARGE_CAPACITY / DESIGN_CAPACITY * 100.0;

        BatteryPackSnapshot {
            pack_voltage: round_to(pack_voltage, 2),
            pack_current: round_to(15.0 + self.rng.gen::<f64>() * 5.0, 2),
            temperature: round_to(45.0 + self.rng.gen::<f64>() * 5.0, 1),
            state_of_charge: round_to(75.0 - self.rng.gen::<f64>() * 2.0, 1),
            cells,
            design_capacity: DESIGN_CAPACITY,
            full_charge_capacity: FULL_CHARGE_CAPACITY,
            state_of_health: round_to(state_of_health, 1),
            cycle_count: CYCLE_COUNT,
        }
    }
}

impl<R: Rng> TelemetrySource for MockBatteryGenerator<R> {
    fn next_snapshot(&mut self) -> BatteryPackSnapshot {
        self.generate()
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellscope_compute::DiagnosticEngine;

    #[test]
    fn default_pack_shape() {
        let snap = MockBatteryGenerator::seeded(PackLayout::default(), 1).generate();

        assert_eq!(snap.cells.len(), 96);
        let ids: Vec<u32> = snap.cells.iter().map(|c| c.id).collect();
        assert_eq!(ids, (1..=96).collect::<Vec<_>>());
        assert_eq!(snap.state_of_health, 91.3);
        assert_eq!(snap.cycle_count, 312);
        assert!((15.0..=20.0).contains(&snap.pack_current));
        assert!((45.0..=50.0).contains(&snap.temperature));
        assert!((73.0..=75.0).contains(&snap.state_of_charge));
    }

    #[test]
    fn healthy_cells_stay_in_band() {
        let snap = MockBatteryGenerator::seeded(PackLayout::default(), 2).generate();
        for cell in snap.cells.iter().filter(|c| ![15, 52, 78].contains(&c.id)) {
            assert!((3.685..=3.715).contains(&cell.voltage), "cell {}: {}", cell.id, cell.voltage);
            assert!((0.0015..=0.0025).contains(&cell.internal_resistance));
        }
    }

    #[test]
    fn fault_cells_are_injected() {
        let snap = MockBatteryGenerator::seeded(PackLayout::default(), 3).generate();
        let cell = |id: u32| &snap.cells[id as usize - 1];

        assert!((cell(15).voltage - 3.55).abs() <= 0.008);
        assert!((cell(78).voltage - 3.82).abs() <= 0.008);
        assert!((cell(52).internal_resistance - 0.015).abs() <= 0.0004);
    }

    #[test]
    fn pack_voltage_is_series_sum() {
        let snap = MockBatteryGenerator::seeded(PackLayout::default(), 4).generate();
        let expected = snap.cells.iter().map(|c| c.voltage).sum::<f64>() / 24.0;
        assert!((snap.pack_voltage - expected).abs() <= 0.005 + 1e-9);
    }

    #[test]
    fn readings_are_rounded() {
        let snap = MockBatteryGenerator::seeded(PackLayout::default(), 5).generate();
        for cell in &snap.cells {
            assert_eq!(round_to(cell.voltage, 3), cell.voltage);
            assert_eq!(round_to(cell.internal_resistance, 4), cell.internal_resistance);
        }
    }

    #[test]
    fn same_seed_same_snapshot() {
        let a = MockBatteryGenerator::seeded(PackLayout::default(), 99).generate();
        let b = MockBatteryGenerator::seeded(PackLayout::default(), 99).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn small_layout_drops_out_of_range_faults() {
        let layout = PackLayout::with_cells(20);
        assert_eq!(layout.low_voltage_cell, Some(15));
        assert_eq!(layout.high_voltage_cell, None);
        assert_eq!(layout.high_resistance_cell, None);

        let snap = MockBatteryGenerator::seeded(layout, 6).generate();
        assert_eq!(snap.cells.len(), 20);
    }

    #[test]
    fn high_resistance_cell_is_always_flagged() {
        for seed in 0..10 {
            let snap = MockBatteryGenerator::seeded(PackLayout::default(), seed).generate();
            let report = DiagnosticEngine::seeded(seed).analyze(&snap).unwrap();
            let cell = report.cell(52).unwrap();

            assert_eq!(cell.is_anomaly, Some(true), "seed={seed}");
            assert!(cell
                .anomaly_reason
                .as_deref()
                .unwrap_or_default()
                .contains("High"));
        }
    }

    #[test]
    fn healthy_layout_has_no_resistance_faults() {
        let snap = MockBatteryGenerator::seeded(PackLayout::healthy(32), 7).generate();
        assert!(snap.cells.iter().all(|c| c.internal_resistance <= 0.010));
    }
}
