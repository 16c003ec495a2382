//! Static paper/topic/subtopic reference table constraining metadata values.
//!
//! Read-only; the core consults it to derive valid selector choices and to
//! drive the cascade resets on the draft type.

pub struct MainTopic {
    pub name: &'static str,
    pub sub_topic1_list: &'static [&'static str],
}

pub struct Paper {
    pub name: &'static str,
    pub topics: &'static [MainTopic],
}

pub static PAPERS: &[Paper] = &[
    Paper {
        name: "Paper 1",
        topics: &[
            MainTopic {
                name: "Particles and Waves",
                sub_topic1_list: &[
                    "Particles",
                    "Electromagnetic radiation and quantum phenomena",
                    "Progressive and stationary waves",
                    "Refraction, diffraction and interference",
                ],
            },
            MainTopic {
                name: "Mechanics and Materials",
                sub_topic1_list: &[
                    "Force and Moments",
                    "Motion",
                    "Newton's Laws and Momentum",
                    "Work, Energy and Power",
                    "Materials",
                ],
            },
            MainTopic {
                name: "Electricity",
                sub_topic1_list: &[
                    "Resistivity",
                    "Potential divider and internal resistance",
                    "General Electricity",
                ],
            },
            MainTopic {
                name: "Further Mechanics",
                sub_topic1_list: &["Circular motion", "Simple Harmonic Motion (SHM)"],
            },
        ],
    },
    Paper {
        name: "Paper 2",
        topics: &[
            MainTopic {
                name: "Thermal Physics",
                sub_topic1_list: &[
                    "Specific Heat Capacity (SHC) and Latent Heat (LH)",
                    "Ideal gases",
                    "Kinetic theory",
                ],
            },
            MainTopic {
                name: "Gravitational Fields",
                sub_topic1_list: &[
                    "Newton's Laws and Field Strength",
                    "Gravitational Potential",
                    "Orbits",
                ],
            },
            MainTopic {
                name: "Electric Fields",
                sub_topic1_list: &["Coulomb's Law and Field Strength", "Electric Potential"],
            },
            MainTopic {
                name: "Capacitance",
                sub_topic1_list: &[
                    "Capacitance and the Capacitor",
                    "Energy stored in a capacitor",
                    "Charge and Discharge of capacitors",
                ],
            },
            MainTopic {
                name: "Magnetic Fields",
                sub_topic1_list: &[
                    "Force on Charge/Conductor",
                    "Electromagnetic Induction",
                    "Alternating currents (AC)",
                    "Transformers",
                ],
            },
            MainTopic {
                name: "Nuclear Physics",
                sub_topic1_list: &[
                    "Rutherford scattering, and alpha, beta, gamma radiation",
                    "Radioactive decay and Nuclear instability",
                    "Mass and energy, Fission, Fusion and Safety",
                ],
            },
        ],
    },
];

pub fn papers() -> Vec<&'static str> {
    PAPERS.iter().map(|p| p.name).collect()
}

pub fn main_topics(paper: &str) -> Vec<&'static str> {
    PAPERS
        .iter()
        .find(|p| p.name == paper)
        .map(|p| p.topics.iter().map(|t| t.name).collect())
        .unwrap_or_default()
}

pub fn sub_topic1_list(paper: &str, main_topic: &str) -> &'static [&'static str] {
    PAPERS
        .iter()
        .find(|p| p.name == paper)
        .and_then(|p| p.topics.iter().find(|t| t.name == main_topic))
        .map(|t| t.sub_topic1_list)
        .unwrap_or(&[])
}

/// Same list as [`sub_topic1_list`] minus whatever `sub_topic1` holds.
pub fn sub_topic2_choices(paper: &str, main_topic: &str, sub_topic1: &str) -> Vec<&'static str> {
    sub_topic1_list(paper, main_topic)
        .iter()
        .copied()
        .filter(|s| *s != sub_topic1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn papers_are_listed_in_order() {
        assert_eq!(papers(), vec!["Paper 1", "Paper 2"]);
    }

    #[test]
    fn unknown_paper_yields_no_topics() {
        assert!(main_topics("Paper 3").is_empty());
        assert!(sub_topic1_list("Paper 3", "Electricity").is_empty());
    }

    #[test]
    fn sub_topic2_excludes_current_sub_topic1() {
        let choices = sub_topic2_choices("Paper 1", "Mechanics and Materials", "Motion");
        assert!(!choices.contains(&"Motion"));
        assert!(choices.contains(&"Materials"));
        assert_eq!(
            choices.len(),
            sub_topic1_list("Paper 1", "Mechanics and Materials").len() - 1
        );
    }
}
