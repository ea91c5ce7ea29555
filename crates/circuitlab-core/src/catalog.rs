//! Component catalog module
//!
//! This module provides:
//! - Part definitions (terminal layout, editable fields, default values)
//! - The standard catalog of toy electronics parts and prefab kits
//! - Registration of extra parts (plugin manifests)
//! - Starter kit listings
//!
//! The catalog is pure data. Instantiating an entry produces a
//! [`ComponentInstance`] whose terminal ids are unique to that instance.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::{
    ComponentId, ComponentInstance, ComponentKind, Point, Polarity, Rotation, Size, Terminal,
    TerminalId,
};

/// Palette grouping for catalog entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    /// Batteries and supplies
    Power,
    /// Resistors, capacitors, potentiometers
    Passive,
    /// Semiconductors and ICs
    Active,
    /// Parts the user sees, hears, or presses
    Io,
    /// Pre-wired sub-circuits
    Prefab,
}

impl std::fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Power => write!(f, "Power"),
            Self::Passive => write!(f, "Passive"),
            Self::Active => write!(f, "Active"),
            Self::Io => write!(f, "Input/Output"),
            Self::Prefab => write!(f, "Prefab"),
        }
    }
}

/// Terminal layout entry; ids are made unique when instantiated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalTemplate {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<Polarity>,
    pub position: Point,
}

/// Input widget for an editable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    Select,
    Text,
}

/// One choice of a `select` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

/// A value the user may edit on a placed part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditableField {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
}

/// Default value of an editable field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl From<&FieldValue> for serde_json::Value {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Number(n) => serde_json::json!(n),
            FieldValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// Definition of an instantiable part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub kind: ComponentKind,
    pub label: String,
    pub description: String,
    pub category: ComponentCategory,
    pub terminals: Vec<TerminalTemplate>,
    #[serde(default)]
    pub editable_fields: Vec<EditableField>,
    #[serde(default)]
    pub default_values: BTreeMap<String, FieldValue>,
    /// Text shown on the part right after placement, e.g. `330 Ω`
    pub display_value: String,
    /// Unrotated body size used for hit-testing
    pub body_size: Size,
    #[serde(default)]
    pub prefab: bool,
}

impl CatalogEntry {
    /// Create an entry with no terminals or fields
    pub fn new(
        kind: ComponentKind,
        label: &str,
        description: &str,
        category: ComponentCategory,
        display_value: &str,
        body_size: Size,
    ) -> Self {
        Self {
            kind,
            label: label.to_string(),
            description: description.to_string(),
            category,
            terminals: Vec::new(),
            editable_fields: Vec::new(),
            default_values: BTreeMap::new(),
            display_value: display_value.to_string(),
            body_size,
            prefab: category == ComponentCategory::Prefab,
        }
    }

    /// Add a terminal to the layout
    pub fn terminal(mut self, id: &str, label: &str, polarity: Option<Polarity>, x: f64, y: f64) -> Self {
        self.terminals.push(TerminalTemplate {
            id: id.to_string(),
            label: label.to_string(),
            polarity,
            position: Point::new(x, y),
        });
        self
    }

    /// Add a numeric field with its default
    pub fn number_field(mut self, key: &str, label: &str, unit: &str, min: f64, max: f64, default: f64) -> Self {
        self.editable_fields.push(EditableField {
            key: key.to_string(),
            label: label.to_string(),
            field_type: FieldType::Number,
            min: Some(min),
            max: Some(max),
            unit: Some(unit.to_string()),
            options: Vec::new(),
        });
        self.default_values
            .insert(key.to_string(), FieldValue::Number(default));
        self
    }

    /// Add a select field; the first option is the default
    pub fn select_field(mut self, key: &str, label: &str, options: &[(&str, &str)]) -> Self {
        self.editable_fields.push(EditableField {
            key: key.to_string(),
            label: label.to_string(),
            field_type: FieldType::Select,
            min: None,
            max: None,
            unit: None,
            options: options
                .iter()
                .map(|(label, value)| FieldOption {
                    label: label.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        });
        if let Some((_, value)) = options.first() {
            self.default_values
                .insert(key.to_string(), FieldValue::Text(value.to_string()));
        }
        self
    }

    /// Look up an editable field by key
    pub fn field(&self, key: &str) -> Option<&EditableField> {
        self.editable_fields.iter().find(|f| f.key == key)
    }

    /// Build a fresh instance at `position`.
    ///
    /// Terminal ids get a random suffix so two instances of the same part
    /// never share a terminal id. Default field values are copied into the
    /// instance metadata. The position is used as given; snapping is the
    /// caller's job.
    pub fn instantiate(&self, position: Point) -> ComponentInstance {
        ComponentInstance {
            id: ComponentId::generate(),
            kind: self.kind,
            name: self.label.clone(),
            position,
            rotation: Rotation::Deg0,
            terminals: self
                .terminals
                .iter()
                .map(|t| Terminal {
                    id: TerminalId::instance_of(&t.id),
                    label: t.label.clone(),
                    polarity: t.polarity,
                    local_position: t.position,
                })
                .collect(),
            value: self.display_value.clone(),
            metadata: self
                .default_values
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                .collect(),
        }
    }
}

/// Registry of instantiable parts
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    entries: BTreeMap<ComponentKind, CatalogEntry>,
}

impl ComponentCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry
    pub fn register(&mut self, entry: CatalogEntry) {
        if self.entries.contains_key(&entry.kind) {
            tracing::debug!("Replacing catalog entry for {}", entry.kind);
        }
        self.entries.insert(entry.kind, entry);
    }

    /// Remove an entry
    pub fn remove(&mut self, kind: ComponentKind) -> Option<CatalogEntry> {
        self.entries.remove(&kind)
    }

    /// Get an entry by kind
    pub fn get(&self, kind: ComponentKind) -> Option<&CatalogEntry> {
        self.entries.get(&kind)
    }

    /// Whether the catalog can instantiate `kind`
    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// All entries, in kind order
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Entries in one palette category
    pub fn by_category(&self, category: ComponentCategory) -> Vec<&CatalogEntry> {
        self.entries
            .values()
            .filter(|e| e.category == category)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the standard catalog
pub fn init_standard_catalog() -> ComponentCatalog {
    use ComponentCategory::*;
    use ComponentKind as K;
    use Polarity::*;

    let two_terminal = Size::new(80.0, 40.0);
    let three_terminal = Size::new(64.0, 48.0);

    let mut catalog = ComponentCatalog::new();

    catalog.register(
        CatalogEntry::new(K::Battery, "Battery", "Provides a DC voltage source.", Power, "9 V", two_terminal)
            .terminal("positive", "+", Some(Positive), -32.0, 0.0)
            .terminal("negative", "-", Some(Negative), 32.0, 0.0)
            .number_field("voltage", "Voltage", "V", 1.0, 12.0, 9.0),
    );
    catalog.register(
        CatalogEntry::new(K::DcSource, "DC Source", "Adjustable DC supply.", Power, "5 V", two_terminal)
            .terminal("positive", "+", Some(Positive), -32.0, 0.0)
            .terminal("negative", "-", Some(Negative), 32.0, 0.0)
            .number_field("voltage", "Voltage", "V", 0.0, 30.0, 5.0),
    );
    catalog.register(
        CatalogEntry::new(K::Resistor, "Resistor", "Limits current to protect components.", Passive, "330 Ω", two_terminal)
            .terminal("a", "A", Some(Input), -28.0, 0.0)
            .terminal("b", "B", Some(Output), 28.0, 0.0)
            .number_field("resistance", "Resistance", "Ω", 1.0, 1_000_000.0, 330.0),
    );
    catalog.register(
        CatalogEntry::new(K::Capacitor, "Capacitor", "Stores charge to smooth or delay signals.", Passive, "10 µF", two_terminal)
            .terminal("a", "+", Some(Positive), -24.0, 0.0)
            .terminal("b", "-", Some(Negative), 24.0, 0.0)
            .number_field("capacitance", "Capacitance", "µF", 0.001, 10_000.0, 10.0),
    );
    catalog.register(
        CatalogEntry::new(K::Led, "LED", "Light emitting diode. Needs correct polarity.", Io, "Red", two_terminal)
            .terminal("anode", "+", Some(Positive), -26.0, 0.0)
            .terminal("cathode", "-", Some(Negative), 26.0, 0.0)
            .select_field("color", "Color", &[("Red", "red"), ("Green", "green"), ("Blue", "blue")]),
    );
    catalog.register(
        CatalogEntry::new(K::Diode, "Diode", "One-way valve for current flow.", Active, "1N4148", two_terminal)
            .terminal("anode", "+", Some(Positive), -24.0, 0.0)
            .terminal("cathode", "-", Some(Negative), 24.0, 0.0),
    );
    catalog.register(
        CatalogEntry::new(K::NpnTransistor, "NPN Transistor", "Switch or amplifier controlled by a small base current.", Active, "2N3904", three_terminal)
            .terminal("collector", "C", Some(Collector), -24.0, -12.0)
            .terminal("base", "B", Some(Base), 0.0, 18.0)
            .terminal("emitter", "E", Some(Emitter), 24.0, -12.0),
    );
    catalog.register(
        CatalogEntry::new(K::Mosfet, "MOSFET", "Voltage-driven transistor ideal for switching loads.", Active, "IRLZ44N", three_terminal)
            .terminal("drain", "D", Some(Drain), -26.0, -12.0)
            .terminal("gate", "G", Some(Gate), 0.0, 18.0)
            .terminal("source", "S", Some(Source), 26.0, -12.0),
    );
    catalog.register(
        CatalogEntry::new(K::Pushbutton, "Pushbutton", "Momentary switch for user input.", Io, "Momentary", Size::new(56.0, 40.0))
            .terminal("a", "A", Some(Input), -22.0, -8.0)
            .terminal("b", "B", Some(Input), -22.0, 8.0)
            .terminal("c", "C", Some(Output), 22.0, -8.0)
            .terminal("d", "D", Some(Output), 22.0, 8.0),
    );
    catalog.register(
        CatalogEntry::new(K::Potentiometer, "Potentiometer", "Adjustable resistor for tuning brightness and timing.", Passive, "10 kΩ", three_terminal)
            .terminal("a", "A", Some(Input), -28.0, -12.0)
            .terminal("wiper", "W", Some(Control), 0.0, 18.0)
            .terminal("b", "B", Some(Output), 28.0, -12.0)
            .number_field("resistance", "Resistance", "Ω", 100.0, 1_000_000.0, 10_000.0),
    );
    catalog.register(
        CatalogEntry::new(K::Timer555, "555 Timer", "Versatile timing IC for blinkers and pulses.", Active, "Astable", Size::new(96.0, 96.0))
            .terminal("vcc", "VCC", Some(Positive), -40.0, -24.0)
            .terminal("trig", "TR", Some(Input), -40.0, -8.0)
            .terminal("out", "OUT", Some(Output), 40.0, -8.0)
            .terminal("rst", "RST", Some(Control), -40.0, 8.0)
            .terminal("ctrl", "CV", Some(Control), 40.0, 8.0)
            .terminal("thresh", "TH", Some(Input), -40.0, 24.0)
            .terminal("dis", "DIS", Some(Output), 40.0, 24.0)
            .terminal("gnd", "GND", Some(Negative), 0.0, 40.0)
            .number_field("frequency", "Frequency", "Hz", 0.5, 1000.0, 2.0),
    );
    catalog.register(
        CatalogEntry::new(K::Speaker, "Buzzer", "Plays sound when driven.", Io, "Tone", two_terminal)
            .terminal("positive", "+", Some(Positive), -26.0, 0.0)
            .terminal("negative", "-", Some(Negative), 26.0, 0.0),
    );
    catalog.register(
        CatalogEntry::new(K::Prefab555Blinker, "Blinking LED (555)", "Ready-made astable 555 circuit that blinks an LED around 2 Hz.", Prefab, "2 Hz", Size::new(112.0, 64.0))
            .terminal("power+", "+", Some(Positive), -48.0, -24.0)
            .terminal("power-", "-", Some(Negative), 48.0, -24.0)
            .terminal("led+", "LED+", Some(Positive), -48.0, 24.0)
            .terminal("led-", "LED-", Some(Negative), 48.0, 24.0)
            .number_field("frequency", "Frequency", "Hz", 0.5, 10.0, 2.0),
    );

    catalog
}

/// One line of a starter kit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitItem {
    pub kind: ComponentKind,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A physical parts kit the palette can advertise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarterKit {
    pub id: String,
    pub title: String,
    pub contents: Vec<KitItem>,
    pub tags: Vec<String>,
    #[serde(default)]
    pub gamified: bool,
}

impl StarterKit {
    /// Total number of parts in the kit
    pub fn part_count(&self) -> u32 {
        self.contents.iter().map(|item| item.quantity).sum()
    }
}

/// Kits shipped with the standard catalog
pub fn starter_kits() -> Vec<StarterKit> {
    fn item(kind: ComponentKind, quantity: u32, notes: Option<&str>) -> KitItem {
        KitItem {
            kind,
            quantity,
            notes: notes.map(str::to_string),
        }
    }

    vec![
        StarterKit {
            id: "kit-starter-led".to_string(),
            title: "Starter LED Playground".to_string(),
            contents: vec![
                item(ComponentKind::Battery, 1, Some("5 V USB pack or AA holder")),
                item(ComponentKind::Resistor, 5, Some("Assorted 220–1k Ω")),
                item(ComponentKind::Led, 5, Some("Red, Green, Blue, Yellow, White")),
                item(ComponentKind::Pushbutton, 2, None),
                item(ComponentKind::Timer555, 1, None),
                item(ComponentKind::Capacitor, 3, Some("10 µF, 100 µF, 1 µF")),
            ],
            tags: vec!["beginner".to_string(), "guided".to_string()],
            gamified: true,
        },
        StarterKit {
            id: "kit-audio-beeps".to_string(),
            title: "Beep & Buzz Lab".to_string(),
            contents: vec![
                item(ComponentKind::Speaker, 1, None),
                item(ComponentKind::Mosfet, 1, None),
                item(ComponentKind::Timer555, 1, None),
                item(ComponentKind::Potentiometer, 2, Some("10 kΩ and 100 kΩ")),
            ],
            tags: vec!["audio".to_string(), "intermediate".to_string()],
            gamified: false,
        },
    ]
}
