//! Post-hoc summary computed from run records.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::types::StepRecord;

/// Aggregate indicators derived from a complete run.
///
/// Computed post-hoc from the records so the summary can never disagree
/// with the per-tick data.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Number of ticks.
    pub ticks: usize,
    /// Ticks with energy-saving mode engaged.
    pub energy_saving_ticks: usize,
    /// Ticks with temperature regulation active.
    pub regulation_ticks: usize,
    /// Ticks inside the night window.
    pub night_ticks: usize,
    /// Ticks that started with usage above the daily limit.
    pub over_budget_ticks: usize,
    /// Total number of device sheds across all ticks.
    pub shed_events: usize,
    /// Energy metered over the whole run (kWh).
    pub total_consumption_kwh: f64,
    /// Highest daily usage reached (kWh).
    pub peak_daily_usage_kwh: f64,
    /// Hours each device spent ON.
    pub device_on_hours: BTreeMap<String, f64>,
}

impl RunSummary {
    /// Computes the summary from the complete record vector.
    ///
    /// `limit_kwh` is the daily usage limit the run was evaluated against.
    pub fn from_records(records: &[StepRecord], dt_hours: f64, limit_kwh: f64) -> Self {
        let mut summary = Self {
            ticks: records.len(),
            ..Self::default()
        };

        for r in records {
            summary.energy_saving_ticks += usize::from(r.energy_saving_mode);
            summary.regulation_ticks += usize::from(r.temperature_regulation_active);
            summary.night_ticks += usize::from(r.night_mode);
            summary.over_budget_ticks += usize::from(r.used_today_kwh > limit_kwh);
            summary.shed_events += r.shed_devices.len();
            summary.total_consumption_kwh += r.consumption_kwh;
            summary.peak_daily_usage_kwh = summary
                .peak_daily_usage_kwh
                .max(r.used_today_kwh + r.consumption_kwh);

            for (name, on) in &r.device_status {
                let hours = summary.device_on_hours.entry(name.clone()).or_insert(0.0);
                if *on {
                    *hours += dt_hours;
                }
            }
        }

        summary
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ---")?;
        writeln!(f, "Ticks:                   {}", self.ticks)?;
        writeln!(f, "Energy-saving ticks:     {}", self.energy_saving_ticks)?;
        writeln!(f, "Regulation ticks:        {}", self.regulation_ticks)?;
        writeln!(f, "Night ticks:             {}", self.night_ticks)?;
        writeln!(f, "Over-budget ticks:       {}", self.over_budget_ticks)?;
        writeln!(f, "Shed events:             {}", self.shed_events)?;
        writeln!(
            f,
            "Total consumption:       {:.2} kWh",
            self.total_consumption_kwh
        )?;
        write!(
            f,
            "Peak daily usage:        {:.2} kWh",
            self.peak_daily_usage_kwh
        )?;
        for (name, hours) in &self.device_on_hours {
            write!(f, "\n  {name:<20} {hours:>5.1} h on")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record(t: usize, lights: bool, shed: &[&str], used: f64) -> StepRecord {
        StepRecord {
            timestep: t,
            time: NaiveDate::from_ymd_opt(2024, 10, 1)
                .and_then(|d| d.and_hms_opt(t as u32, 0, 0))
                .unwrap(),
            price: 0.15,
            temperature_c: 21.0,
            energy_saving_mode: t == 1,
            temperature_regulation_active: false,
            night_mode: t == 0,
            used_today_kwh: used,
            reported_used_kwh: used,
            consumption_kwh: 1.5,
            device_status: BTreeMap::from([
                ("Fridge".to_string(), true),
                ("Lights".to_string(), lights),
            ]),
            shed_devices: shed.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn empty_records_give_zero_summary() {
        let s = RunSummary::from_records(&[], 1.0, 30.0);
        assert_eq!(s.ticks, 0);
        assert_eq!(s.total_consumption_kwh, 0.0);
        assert!(s.device_on_hours.is_empty());
    }

    #[test]
    fn counts_modes_and_sheds() {
        let records = vec![
            record(0, false, &[], 0.0),
            record(1, false, &[], 1.5),
            record(2, false, &["Lights"], 31.0),
            record(3, true, &[], 10.0),
        ];
        let s = RunSummary::from_records(&records, 1.0, 30.0);
        assert_eq!(s.ticks, 4);
        assert_eq!(s.night_ticks, 1);
        assert_eq!(s.energy_saving_ticks, 1);
        assert_eq!(s.over_budget_ticks, 1);
        assert_eq!(s.shed_events, 1);
        assert_eq!(s.total_consumption_kwh, 6.0);
        assert_eq!(s.peak_daily_usage_kwh, 32.5);
        assert_eq!(s.device_on_hours.get("Fridge"), Some(&4.0));
        assert_eq!(s.device_on_hours.get("Lights"), Some(&1.0));
    }

    #[test]
    fn display_lists_devices() {
        let s = RunSummary::from_records(&[record(0, true, &[], 0.0)], 0.5, 30.0);
        let text = format!("{s}");
        assert!(text.contains("Run Summary"));
        assert!(text.contains("Lights"));
    }
}
