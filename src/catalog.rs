use crate::error::{TrackerError, TrackerResult};
use crate::models::{SubstanceGroup, SubstanceProfile};
use log::debug;

fn preset(
    name: &str,
    half_life_hours: f64,
    tmax_hours: f64,
    unit: &str,
    is_lipophilic: bool,
    is_critical: bool,
    group: SubstanceGroup,
) -> SubstanceProfile {
    let mut profile = SubstanceProfile::new(name, half_life_hours, tmax_hours)
        .with_unit(unit)
        .in_group(group);
    profile.is_lipophilic = is_lipophilic;
    profile.is_critical = is_critical;
    profile
}

/// The built-in substances.
pub fn presets() -> Vec<SubstanceProfile> {
    use SubstanceGroup::{Functional, Maintenance};

    vec![
        preset("Escitalopram", 30.0, 4.0, "mg", false, true, Maintenance),
        preset("Lamotrigine", 25.0, 2.5, "mg", false, true, Maintenance),
        preset("Buspirone", 1.5, 1.0, "mg", false, false, Maintenance),
        preset("Levothyroxine", 144.0, 3.0, "μg", false, true, Maintenance)
            .with_notes("Critical; take on an empty stomach"),
        preset("Gabapentin", 6.0, 3.0, "mg", false, false, Functional),
        preset("Lorazepam", 15.0, 2.0, "mg", true, false, Functional),
        preset("Zolpidem", 2.4, 1.5, "mg", true, false, Functional),
        preset("Eszopiclone", 6.0, 1.0, "mg", true, false, Functional),
        preset("Ibuprofen", 2.0, 1.5, "mg", false, false, Functional),
        preset("Acetaminophen", 2.0, 1.0, "mg", false, false, Functional),
        preset("Atomoxetine", 5.0, 1.5, "mg", false, false, Functional),
        preset("Methylphenidate", 2.5, 1.5, "mg", false, false, Functional),
        preset("Caffeine", 5.0, 0.5, "mg", false, false, Functional),
        preset("Dimenhydrinate", 8.0, 1.5, "mg", false, false, Functional),
        preset("Melatonin", 0.75, 1.0, "mg", false, false, Functional),
        preset("L-Theanine", 1.0, 0.5, "mg", false, false, Functional),
        preset("Magnesium L-Threonate", 12.0, 2.0, "mg", false, false, Maintenance),
        preset("Aniracetam", 1.5, 1.0, "mg", false, false, Functional),
        preset("Vinpocetine", 2.0, 1.0, "mg", false, false, Functional),
    ]
}

/// Preset profiles plus user-defined ones. A custom profile may not reuse the
/// name of a preset.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    presets: Vec<SubstanceProfile>,
    custom: Vec<SubstanceProfile>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_presets() -> Self {
        Self {
            presets: presets(),
            custom: Vec::new(),
        }
    }

    pub fn with_custom(mut self, profiles: impl IntoIterator<Item = SubstanceProfile>) -> TrackerResult<Self> {
        for profile in profiles {
            self.upsert_custom(profile)?;
        }
        Ok(self)
    }

    pub fn find(&self, name: &str) -> Option<&SubstanceProfile> {
        self.presets.iter()
            .chain(self.custom.iter())
            .find(|profile| profile.name == name)
    }

    pub fn get(&self, name: &str) -> TrackerResult<&SubstanceProfile> {
        self.find(name)
            .ok_or_else(|| TrackerError::UnknownSubstance(name.to_string()))
    }

    /// Every profile, presets first. Names are distinct.
    pub fn profiles(&self) -> Vec<SubstanceProfile> {
        self.presets.iter()
            .chain(self.custom.iter())
            .cloned()
            .collect()
    }

    pub fn in_group(&self, group: SubstanceGroup) -> Vec<SubstanceProfile> {
        self.profiles()
            .into_iter()
            .filter(|profile| profile.group == group)
            .collect()
    }

    /// Adds or replaces a user-defined profile. Only later calculations see
    /// the change; records are never rewritten.
    pub fn upsert_custom(&mut self, mut profile: SubstanceProfile) -> TrackerResult<()> {
        profile.validate()?;
        profile.is_custom = true;

        if self.presets.iter().any(|p| p.name == profile.name) {
            return Err(TrackerError::Validation(
                format!("{} is a built-in substance and cannot be redefined", profile.name)
            ));
        }

        match self.custom.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => {
                debug!("Replacing custom substance {}", profile.name);
                *existing = profile;
            },
            None => {
                debug!("Adding custom substance {}", profile.name);
                self.custom.push(profile);
            },
        }
        Ok(())
    }

    pub fn remove_custom(&mut self, name: &str) -> Option<SubstanceProfile> {
        let index = self.custom.iter().position(|p| p.name == name)?;
        Some(self.custom.remove(index))
    }

    pub fn len(&self) -> usize {
        self.presets.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty() && self.custom.is_empty()
    }
}
