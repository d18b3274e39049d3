//! Material catalog: toolkit reference materials plus two geological composites.

use log::warn;
use std::collections::BTreeMap;

/// Name of the material substituted when a lookup fails.
pub const DEFAULT_MATERIAL: &str = "G4_POLYETHYLENE";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    pub z: u32,
    /// Molar mass in g/mol.
    pub a: f64,
}

impl Element {
    /// Radiation length in g/cm2 (Dahl's fit, good to a few percent above helium).
    pub fn radiation_length(&self) -> f64 {
        let z = self.z as f64;
        716.4 * self.a / (z * (z + 1.0) * (287.0 / z.sqrt()).ln())
    }
}

const ELEMENTS: &[Element] = &[
    Element { symbol: "H", z: 1, a: 1.008 },
    Element { symbol: "C", z: 6, a: 12.011 },
    Element { symbol: "N", z: 7, a: 14.007 },
    Element { symbol: "O", z: 8, a: 15.999 },
    Element { symbol: "Na", z: 11, a: 22.990 },
    Element { symbol: "Mg", z: 12, a: 24.305 },
    Element { symbol: "Al", z: 13, a: 26.982 },
    Element { symbol: "Si", z: 14, a: 28.085 },
    Element { symbol: "Cl", z: 17, a: 35.45 },
    Element { symbol: "Ar", z: 18, a: 39.948 },
    Element { symbol: "K", z: 19, a: 39.098 },
    Element { symbol: "Ca", z: 20, a: 40.078 },
    Element { symbol: "Fe", z: 26, a: 55.845 },
    Element { symbol: "Pb", z: 82, a: 207.2 },
];

pub fn element(symbol: &str) -> Option<Element> {
    ELEMENTS.iter().copied().find(|e| e.symbol == symbol)
}

type Recipe = (&'static str, f64, &'static [(&'static str, f64)]);

// (name, density g/cm3, mass fractions)
const REFERENCE_MATERIALS: &[Recipe] = &[
    ("G4_POLYETHYLENE", 0.94, &[("H", 0.143711), ("C", 0.856289)]),
    ("G4_POLYPROPYLENE", 0.90, &[("H", 0.143711), ("C", 0.856289)]),
    ("G4_POLYSTYRENE", 1.06, &[("H", 0.077421), ("C", 0.922579)]),
    ("G4_PLEXIGLASS", 1.19, &[("H", 0.080538), ("C", 0.599848), ("O", 0.319614)]),
    ("G4_MYLAR", 1.40, &[("H", 0.041959), ("C", 0.625017), ("O", 0.333025)]),
    ("G4_POLYVINYL_CHLORIDE", 1.30, &[("H", 0.04838), ("C", 0.38436), ("Cl", 0.56726)]),
    (
        "G4_NYLON-6-6",
        1.14,
        &[("H", 0.097976), ("C", 0.636856), ("N", 0.123779), ("O", 0.141389)],
    ),
    ("G4_SILICON_DIOXIDE", 2.32, &[("Si", 0.467465), ("O", 0.532535)]),
    ("G4_CALCIUM_CARBONATE", 2.80, &[("C", 0.120003), ("O", 0.479554), ("Ca", 0.400443)]),
    ("G4_ALUMINUM_OXIDE", 3.97, &[("O", 0.470749), ("Al", 0.529251)]),
    ("G4_FERRIC_OXIDE", 5.2, &[("O", 0.300567), ("Fe", 0.699433)]),
    ("G4_Si", 2.33, &[("Si", 1.0)]),
    (
        "G4_AIR",
        0.00120479,
        &[("C", 0.000124), ("N", 0.755268), ("O", 0.231781), ("Ar", 0.012827)],
    ),
    ("G4_LEAD_OXIDE", 9.53, &[("O", 0.071682), ("Pb", 0.928318)]),
    ("G4_Pb", 11.35, &[("Pb", 1.0)]),
];

// Oxide compositions converted to elemental mass fractions; the sums fall
// slightly short of 1 and are kept as written.
const CUSTOM_MATERIALS: &[Recipe] = &[
    (
        "Obsidian",
        2.40,
        &[
            ("Si", 0.3505),
            ("O", 0.4830),
            ("Al", 0.0688),
            ("Na", 0.0371),
            ("K", 0.0332),
            ("Fe", 0.0140),
            ("Ca", 0.0071),
        ],
    ),
    (
        "Granite",
        2.70,
        &[
            ("Si", 0.3363),
            ("O", 0.4810),
            ("Al", 0.0741),
            ("K", 0.0332),
            ("Na", 0.0223),
            ("Fe", 0.0210),
            ("Ca", 0.0143),
        ],
    ),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// Mass density in g/cm3.
    pub density: f64,
    pub components: Vec<(Element, f64)>,
}

impl Material {
    fn from_recipe((name, density, fractions): &Recipe) -> Self {
        let components = fractions
            .iter()
            .filter_map(|&(symbol, w)| element(symbol).map(|e| (e, w)))
            .collect();
        Self {
            name: name.to_string(),
            density: *density,
            components,
        }
    }

    pub fn fraction_sum(&self) -> f64 {
        self.components.iter().map(|(_, w)| w).sum()
    }

    /// Radiation length in cm, from the mixture rule over normalised fractions.
    pub fn radiation_length(&self) -> f64 {
        let total = self.fraction_sum();
        if total <= 0.0 || self.density <= 0.0 {
            return f64::INFINITY;
        }
        let inverse: f64 = self
            .components
            .iter()
            .map(|(e, w)| (w / total) / e.radiation_length())
            .sum();
        1.0 / inverse / self.density
    }
}

/// Name-to-material mapping, read-only once built.
#[derive(Debug, Clone)]
pub struct MaterialCatalog {
    reference: BTreeMap<String, Material>,
    custom: BTreeMap<String, Material>,
    fallback: Material,
}

impl MaterialCatalog {
    pub fn standard() -> Self {
        let build = |recipes: &[Recipe]| {
            recipes
                .iter()
                .map(|recipe| {
                    let material = Material::from_recipe(recipe);
                    (material.name.clone(), material)
                })
                .collect::<BTreeMap<_, _>>()
        };
        let reference = build(REFERENCE_MATERIALS);
        let custom = build(CUSTOM_MATERIALS);
        let fallback = REFERENCE_MATERIALS
            .iter()
            .find(|(name, _, _)| *name == DEFAULT_MATERIAL)
            .map(Material::from_recipe)
            .unwrap_or_else(|| Material::from_recipe(&REFERENCE_MATERIALS[0]));
        Self {
            reference,
            custom,
            fallback,
        }
    }

    /// Looks a name up in the reference set first, then the custom set.
    pub fn find(&self, name: &str) -> Option<&Material> {
        self.reference.get(name).or_else(|| self.custom.get(name))
    }

    /// Like [`find`](Self::find) but substitutes the default material,
    /// logging a diagnostic, when the name is unknown.
    pub fn resolve_or_default(&self, name: &str) -> &Material {
        match self.find(name) {
            Some(material) => material,
            None => {
                warn!(
                    "material {} not found, using {}",
                    name, self.fallback.name
                );
                &self.fallback
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.reference.keys().chain(self.custom.keys()).map(String::as_str)
    }
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
