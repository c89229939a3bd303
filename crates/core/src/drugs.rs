//! Static anaesthetic drug reference data.
//!
//! Display-only content: nothing here is computed from patient data.

use serde::Serialize;
use DrugCategory::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrugCategory {
    IntravenousInduction,
    Opioid,
    Benzodiazepine,
    NeuromuscularBlocker,
    Reversal,
    Inhalational,
    LocalAnesthetic,
    Sedative,
}

impl std::fmt::Display for DrugCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            DrugCategory::IntravenousInduction => "Intravenous Induction Agents",
            DrugCategory::Opioid => "Opioids (Analgesics)",
            DrugCategory::Benzodiazepine => "Benzodiazepines (Anxiolytics and Amnestics)",
            DrugCategory::NeuromuscularBlocker => "Neuromuscular Blocking Agents (Paralytics)",
            DrugCategory::Reversal => "Reversal Agents",
            DrugCategory::Inhalational => "Inhalational Anesthetics",
            DrugCategory::LocalAnesthetic => "Local Anesthetics",
            DrugCategory::Sedative => "Sedatives and Hypnotics",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrugReference {
    pub name: &'static str,
    pub dosage: &'static str,
    pub category: DrugCategory,
}

const fn drug(name: &'static str, dosage: &'static str, category: DrugCategory) -> DrugReference {
    DrugReference {
        name,
        dosage,
        category,
    }
}

static FORMULARY: [DrugReference; 31] = [
    drug("Propofol", "1.5-2.5 mg/kg", IntravenousInduction),
    drug("Etomidate", "0.2-0.3 mg/kg", IntravenousInduction),
    drug("Thiopental", "3-5 mg/kg", IntravenousInduction),
    drug("Ketamine", "1-2 mg/kg", IntravenousInduction),
    drug("Fentanyl", "1-2 mcg/kg", Opioid),
    drug("Morphine", "0.1-0.2 mg/kg", Opioid),
    drug("Remifentanil", "0.05-2 mcg/kg/min (infusion)", Opioid),
    drug("Sufentanil", "0.1-0.4 mcg/kg", Opioid),
    drug("Hydromorphone", "0.015 mg/kg", Opioid),
    drug("Midazolam", "0.025-0.1 mg/kg", Benzodiazepine),
    drug("Lorazepam", "0.02-0.06 mg/kg", Benzodiazepine),
    drug("Diazepam", "0.1-0.2 mg/kg", Benzodiazepine),
    drug("Succinylcholine", "1-1.5 mg/kg", NeuromuscularBlocker),
    drug("Rocuronium", "0.6-1.2 mg/kg", NeuromuscularBlocker),
    drug("Vecuronium", "0.1 mg/kg", NeuromuscularBlocker),
    drug("Cisatracurium", "0.1-0.2 mg/kg", NeuromuscularBlocker),
    drug("Atracurium", "0.4-0.5 mg/kg", NeuromuscularBlocker),
    drug("Neostigmine", "0.04-0.08 mg/kg (with glycopyrrolate)", Reversal),
    drug(
        "Sugammadex",
        "2-16 mg/kg (depending on the level of blockade)",
        Reversal,
    ),
    drug("Flumazenil", "0.2 mg (may repeat up to 1 mg)", Reversal),
    drug("Naloxone", "0.04-0.4 mg (titrate to effect)", Reversal),
    drug("Sevoflurane", "0.5-3% (inhalational)", Inhalational),
    drug("Isoflurane", "0.5-2% (inhalational)", Inhalational),
    drug("Desflurane", "3-9% (inhalational)", Inhalational),
    drug("Nitrous Oxide", "25-70% (as an adjunct)", Inhalational),
    drug(
        "Lidocaine",
        "1-2 mg/kg (max dose without epinephrine: 4 mg/kg, with epinephrine: 7 mg/kg)",
        LocalAnesthetic,
    ),
    drug(
        "Bupivacaine",
        "1.5-2.5 mg/kg (max dose: 2.5 mg/kg without epinephrine)",
        LocalAnesthetic,
    ),
    drug(
        "Ropivacaine",
        "0.2-0.5 mg/kg (max dose: 3 mg/kg)",
        LocalAnesthetic,
    ),
    drug(
        "Mepivacaine",
        "1-2 mg/kg (max dose: 5 mg/kg without epinephrine)",
        LocalAnesthetic,
    ),
    drug("Dexmedetomidine", "0.2-1 mcg/kg/hr (infusion)", Sedative),
    drug(
        "Propofol (sedative dose)",
        "25-75 mcg/kg/min (infusion)",
        Sedative,
    ),
];

/// The full reference list, in display order.
pub fn formulary() -> &'static [DrugReference] {
    &FORMULARY
}

/// Case-insensitive lookup by exact drug name.
pub fn find_drug(name: &str) -> Option<&'static DrugReference> {
    let name = name.trim();
    formulary().iter().find(|d| d.name.eq_ignore_ascii_case(name))
}
