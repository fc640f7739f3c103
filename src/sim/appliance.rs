use serde::Deserialize;

/// Static description of an appliance that switches on at random.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplianceProfile {
    /// Unique name; at most one instance per name runs at a time.
    pub name: String,
    /// Draw while running (W).
    pub power_w: f64,
    /// Length of one cycle in ticks.
    pub duration_ticks: u32,
    /// Chance of switching on during a tick while dormant, in `[0, 1)`.
    pub activation_probability: f64,
}

impl ApplianceProfile {
    pub fn new(
        name: impl Into<String>,
        power_w: f64,
        duration_ticks: u32,
        activation_probability: f64,
    ) -> Self {
        Self {
            name: name.into(),
            power_w,
            duration_ticks,
            activation_probability,
        }
    }
}

/// An appliance in the middle of a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAppliance {
    pub name: String,
    pub power_w: f64,
    pub ticks_remaining: u32,
}

impl ActiveAppliance {
    /// Starts a full cycle of `profile`.
    pub fn start(profile: &ApplianceProfile) -> Self {
        Self {
            name: profile.name.clone(),
            power_w: profile.power_w,
            ticks_remaining: profile.duration_ticks,
        }
    }
}

/// Kettle, microwave, oven and TV of a typical household.
pub fn default_appliances() -> Vec<ApplianceProfile> {
    vec![
        ApplianceProfile::new("Kettle", 2000.0, 2, 0.02),
        ApplianceProfile::new("Microwave", 1200.0, 3, 0.03),
        ApplianceProfile::new("Oven", 3500.0, 10, 0.01),
        ApplianceProfile::new("TV", 150.0, 120, 0.05),
    ]
}
