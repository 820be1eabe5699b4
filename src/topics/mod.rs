//! Fixed, ordered table of topic phrases and the image attached to each.
//!
//! Table order is match priority: the composer walks entries front to back
//! and the first topic judged equivalent (with an existing asset) wins.

use std::path::{Path, PathBuf};

/// Topic phrases and their image assets, relative to the asset directory.
const BUILTIN_TOPICS: &[(&str, &str)] = &[
    ("грыжа шейного диска", "images/neck_hernia.png"),
    ("поясничная грыжа", "images/lumbar_hernia.png"),
    ("мышечные и суставные боли", "images/muscle_joint_pain.png"),
    ("разрыв мениска", "images/meniscus.png"),
    ("ревматизм", "images/rheumatism.png"),
    ("потеря жидкости в коленях", "images/knee_fluid_loss.png"),
    ("беспокойные ноги", "images/restless_legs.png"),
    ("кальцификация", "images/calcification.png"),
    ("онемение и слабость", "images/numbness.png"),
    ("сахарный диабет", "images/diabetes.png"),
    ("мигрень", "images/migraine.png"),
    ("артериальное давление", "images/blood_pressure.png"),
    ("псориаз", "images/psoriasis.png"),
    ("экзема", "images/psoriasis.png"),
    ("рожа", "images/psoriasis.png"),
    ("варикозное расширение вен", "images/varicose.png"),
    ("свертывание крови", "images/clotting.png"),
    ("зоб", "images/goiter.png"),
    ("астма", "images/asthma.png"),
    ("бронхит", "images/asthma.png"),
    ("хобл", "images/asthma.png"),
    ("фибромиалгия", "images/fibromyalgia.png"),
    ("рассеянный склероз", "images/ms.png"),
    ("эпилепсия", "images/epilepsy.png"),
    ("средиземноморская анемия", "images/anemia.png"),
    ("паркинсона", "images/parkinson.png"),
    ("головокружение", "images/dizziness.png"),
    ("проблемы со сном", "images/sleep.png"),
    ("концентрация внимания", "images/focus.png"),
    ("гинекологические заболевания", "images/gynecology.png"),
    ("мужские болезни", "images/male.png"),
    ("альцгеймер", "images/alzheimer.png"),
    ("витилиго", "images/vitiligo.png"),
];

/// One topic phrase and the picture sent when a message matches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicEntry {
    /// Free-text label, compared by the oracle exactly as written
    pub phrase: String,
    /// Image asset sent alongside the reply
    pub image_path: PathBuf,
}

impl TopicEntry {
    pub fn new(phrase: impl Into<String>, image_path: impl Into<PathBuf>) -> Self {
        Self {
            phrase: phrase.into(),
            image_path: image_path.into(),
        }
    }
}

/// Immutable ordered topic table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicIndex {
    entries: Vec<TopicEntry>,
}

impl TopicIndex {
    /// Builds an index from entries, keeping their order.
    pub fn new(entries: Vec<TopicEntry>) -> Self {
        Self { entries }
    }

    /// The compiled table with paths relative to the working directory.
    pub fn builtin() -> Self {
        Self::rooted_at(".")
    }

    /// The compiled table with every image path resolved under `assets_dir`.
    pub fn rooted_at(assets_dir: impl AsRef<Path>) -> Self {
        let root = assets_dir.as_ref();
        let entries = BUILTIN_TOPICS
            .iter()
            .map(|(phrase, image)| {
                let path = if root == Path::new(".") {
                    PathBuf::from(image)
                } else {
                    root.join(image)
                };
                TopicEntry::new(*phrase, path)
            })
            .collect();
        Self { entries }
    }

    /// Entries in match-priority order.
    pub fn entries(&self) -> &[TopicEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TopicIndex {
    fn default() -> Self {
        Self::builtin()
    }
}
