//! Anki package (`.apkg`) export.
//!
//! An `.apkg` is a ZIP holding a SQLite collection (`collection.anki2`,
//! schema version 11) and a `media` manifest. Deck and model ids are fixed
//! constants and note guids are derived from content, so importing the same
//! deck twice updates the existing notes instead of duplicating them.
//!
//! Layout of the collection:
//! ```text
//! col    -- one row: models, decks and deck options as JSON
//! notes  -- one row per card: fields joined with 0x1f
//! cards  -- one new card per note (single template per model)
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection};
use serde_json::{json, Value};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::cards::{CardKind, Deck, Flashcard};
use crate::input::strip_html;

use super::{ExportError, Result};

/// Deck identifier shared by every export
pub const DECK_ID: i64 = 2059400110;

/// Base model identifier; each card kind uses `MODEL_ID + kind.ordinal()`
pub const MODEL_ID: i64 = 1607392319;

const FIELD_SEPARATOR: char = '\x1f';

const COLLECTION_FILE: &str = "collection.anki2";

const CARD_CSS: &str = ".card {\n font-family: arial;\n font-size: 20px;\n text-align: center;\n color: black;\n background-color: white;\n}\n";

const SCHEMA: &str = r#"
CREATE TABLE col (
    id              integer primary key,
    crt             integer not null,
    mod             integer not null,
    scm             integer not null,
    ver             integer not null,
    dty             integer not null,
    usn             integer not null,
    ls              integer not null,
    conf            text not null,
    models          text not null,
    decks           text not null,
    dconf           text not null,
    tags            text not null
);
CREATE TABLE notes (
    id              integer primary key,
    guid            text not null,
    mid             integer not null,
    mod             integer not null,
    usn             integer not null,
    tags            text not null,
    flds            text not null,
    sfld            integer not null,
    csum            integer not null,
    flags           integer not null,
    data            text not null
);
CREATE TABLE cards (
    id              integer primary key,
    nid             integer not null,
    did             integer not null,
    ord             integer not null,
    mod             integer not null,
    usn             integer not null,
    type            integer not null,
    queue           integer not null,
    due             integer not null,
    ivl             integer not null,
    factor          integer not null,
    reps            integer not null,
    lapses          integer not null,
    left            integer not null,
    odue            integer not null,
    odid            integer not null,
    flags           integer not null,
    data            text not null
);
CREATE TABLE revlog (
    id              integer primary key,
    cid             integer not null,
    usn             integer not null,
    ease            integer not null,
    ivl             integer not null,
    lastIvl         integer not null,
    factor          integer not null,
    time            integer not null,
    type            integer not null
);
CREATE TABLE graves (
    usn             integer not null,
    oid             integer not null,
    type            integer not null
);
CREATE INDEX ix_notes_usn on notes (usn);
CREATE INDEX ix_cards_usn on cards (usn);
CREATE INDEX ix_revlog_usn on revlog (usn);
CREATE INDEX ix_cards_nid on cards (nid);
CREATE INDEX ix_cards_sched on cards (did, queue, due);
CREATE INDEX ix_revlog_cid on revlog (cid);
CREATE INDEX ix_notes_csum on notes (csum);
"#;

/// Card template: which fields go on the front and the back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTemplate {
    pub name: String,
    pub question_format: String,
    pub answer_format: String,
}

/// Note type for one card kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteModel {
    pub id: i64,
    pub name: String,
    pub kind: CardKind,
    pub fields: Vec<String>,
    pub template: NoteTemplate,
}

impl NoteModel {
    /// `Question` on the front, `Answer` below it on the back
    pub fn for_kind(kind: CardKind) -> Self {
        Self {
            id: MODEL_ID + kind.ordinal(),
            name: format!("BatAnki {}", kind.label()),
            kind,
            fields: vec!["Question".to_string(), "Answer".to_string()],
            template: NoteTemplate {
                name: kind.label().to_string(),
                question_format: "{{Question}}".to_string(),
                answer_format: "{{FrontSide}}<hr id=\"answer\">{{Answer}}".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckNote {
    pub model_id: i64,
    pub guid: String,
    /// HTML field values, in model field order
    pub fields: Vec<String>,
    pub tags: Vec<String>,
}

impl DeckNote {
    pub fn from_card(card: &Flashcard) -> Self {
        let kind = card.kind();
        let question = match card {
            Flashcard::Mcq { question, .. } => format!(
                "{}<br><br>{}",
                to_html(question),
                card.lettered_options()
                    .iter()
                    .map(|option| to_html(option))
                    .collect::<Vec<_>>()
                    .join("<br>")
            ),
            _ => to_html(card.prompt()),
        };
        let fields = vec![question, to_html(card.answer())];

        Self {
            model_id: MODEL_ID + kind.ordinal(),
            guid: note_guid(kind, &fields),
            fields,
            tags: vec![kind.label().replace(' ', "_")],
        }
    }
}

/// Everything a deck writer needs: ids, note types and notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckPackage {
    pub deck_id: i64,
    pub deck_name: String,
    pub models: Vec<NoteModel>,
    pub notes: Vec<DeckNote>,
}

impl DeckPackage {
    pub fn from_deck(deck: &Deck) -> Self {
        Self {
            deck_id: DECK_ID,
            deck_name: deck.name.clone(),
            models: CardKind::ALL.iter().map(|&kind| NoteModel::for_kind(kind)).collect(),
            notes: deck.cards.iter().map(DeckNote::from_card).collect(),
        }
    }
}

/// Produces binary deck bytes from a package description
pub trait DeckWriter {
    fn write_package(&self, package: &DeckPackage) -> Result<Vec<u8>>;
}

/// Writes Anki `.apkg` files with SQLite and ZIP
#[derive(Debug, Clone, Copy, Default)]
pub struct AnkiPackageWriter;

impl AnkiPackageWriter {
    /// Build the package in a scratch directory created under `parent`.
    /// The scratch directory is removed before returning, on success or error.
    pub fn write_package_in(&self, parent: &Path, package: &DeckPackage) -> Result<Vec<u8>> {
        let workdir = tempfile::TempDir::new_in(parent)?;
        let collection_path = workdir.path().join(COLLECTION_FILE);
        let package_path = workdir.path().join("deck.apkg");

        write_collection(&collection_path, package)?;
        write_archive(&collection_path, &package_path)?;

        let bytes = fs::read(&package_path)?;
        log::debug!(
            "Wrote {} note(s) to {:?} ({} bytes)",
            package.notes.len(),
            package_path,
            bytes.len()
        );
        Ok(bytes)
    }
}

impl DeckWriter for AnkiPackageWriter {
    fn write_package(&self, package: &DeckPackage) -> Result<Vec<u8>> {
        self.write_package_in(&std::env::temp_dir(), package)
    }
}

fn write_collection(path: &Path, package: &DeckPackage) -> Result<()> {
    let mut conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;

    let now = Utc::now();
    let now_secs = now.timestamp();
    let now_ms = now.timestamp_millis();

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO col VALUES (1, ?1, ?2, ?3, 11, 0, 0, 0, ?4, ?5, ?6, ?7, '{}')",
        params![
            now_secs - now_secs % 86_400,
            now_ms,
            now_ms,
            collection_conf().to_string(),
            models_json(package, now_secs).to_string(),
            decks_json(package, now_secs).to_string(),
            deck_options_json().to_string(),
        ],
    )?;

    for (position, note) in package.notes.iter().enumerate() {
        if !package.models.iter().any(|model| model.id == note.model_id) {
            return Err(ExportError::Malformed(format!(
                "note {} uses unknown model {}",
                position, note.model_id
            )));
        }

        let id = now_ms + position as i64;
        let sort_field = note.fields.first().map(|f| strip_html(f)).unwrap_or_default();
        let tags = if note.tags.is_empty() {
            String::new()
        } else {
            format!(" {} ", note.tags.join(" "))
        };

        tx.execute(
            "INSERT INTO notes VALUES (?1, ?2, ?3, ?4, -1, ?5, ?6, ?7, ?8, 0, '')",
            params![
                id,
                note.guid,
                note.model_id,
                now_secs,
                tags,
                note.fields.join(FIELD_SEPARATOR.to_string().as_str()),
                sort_field,
                field_checksum(&sort_field),
            ],
        )?;

        tx.execute(
            "INSERT INTO cards VALUES (?1, ?2, ?3, 0, ?4, -1, 0, 0, ?5, 0, 0, 0, 0, 0, 0, 0, 0, '')",
            params![id, id, package.deck_id, now_secs, position as i64 + 1],
        )?;
    }

    tx.commit()?;
    Ok(())
}

fn write_archive(collection_path: &Path, package_path: &Path) -> Result<()> {
    let file = File::create(package_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(COLLECTION_FILE, options)?;
    zip.write_all(&fs::read(collection_path)?)?;

    zip.start_file("media", options)?;
    zip.write_all(b"{}")?;

    zip.finish()?;
    Ok(())
}

fn collection_conf() -> Value {
    json!({
        "activeDecks": [1],
        "curDeck": 1,
        "newSpread": 0,
        "collapseTime": 1200,
        "timeLim": 0,
        "estTimes": true,
        "dueCounts": true,
        "curModel": null,
        "nextPos": 1,
        "sortType": "noteFld",
        "sortBackwards": false,
        "addToCur": true
    })
}

fn models_json(package: &DeckPackage, now_secs: i64) -> Value {
    let mut models = serde_json::Map::new();
    for model in &package.models {
        let fields: Vec<Value> = model
            .fields
            .iter()
            .enumerate()
            .map(|(ord, name)| {
                json!({
                    "name": name,
                    "ord": ord,
                    "sticky": false,
                    "rtl": false,
                    "font": "Arial",
                    "size": 20,
                    "media": []
                })
            })
            .collect();

        models.insert(
            model.id.to_string(),
            json!({
                "id": model.id,
                "name": model.name,
                "type": 0,
                "mod": now_secs,
                "usn": -1,
                "sortf": 0,
                "did": package.deck_id,
                "tmpls": [{
                    "name": model.template.name,
                    "ord": 0,
                    "qfmt": model.template.question_format,
                    "afmt": model.template.answer_format,
                    "did": null,
                    "bqfmt": "",
                    "bafmt": ""
                }],
                "flds": fields,
                "css": CARD_CSS,
                "latexPre": "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n",
                "latexPost": "\\end{document}",
                "req": [[0, "any", [0]]],
                "tags": [],
                "vers": []
            }),
        );
    }
    Value::Object(models)
}

fn decks_json(package: &DeckPackage, now_secs: i64) -> Value {
    let deck = |id: i64, name: &str| {
        json!({
            "id": id,
            "name": name,
            "desc": "",
            "mod": now_secs,
            "usn": -1,
            "collapsed": false,
            "browserCollapsed": false,
            "dyn": 0,
            "conf": 1,
            "extendNew": 0,
            "extendRev": 50,
            "newToday": [0, 0],
            "revToday": [0, 0],
            "lrnToday": [0, 0],
            "timeToday": [0, 0]
        })
    };

    let mut decks = serde_json::Map::new();
    decks.insert("1".to_string(), deck(1, "Default"));
    decks.insert(package.deck_id.to_string(), deck(package.deck_id, &package.deck_name));
    Value::Object(decks)
}

fn deck_options_json() -> Value {
    json!({
        "1": {
            "id": 1,
            "name": "Default",
            "mod": 0,
            "usn": 0,
            "maxTaken": 60,
            "autoplay": true,
            "timer": 0,
            "replayq": true,
            "dyn": false,
            "new": {
                "delays": [1, 10],
                "ints": [1, 4, 7],
                "initialFactor": 2500,
                "order": 1,
                "perDay": 20,
                "bury": true,
                "separate": true
            },
            "rev": {
                "perDay": 100,
                "ease4": 1.3,
                "fuzz": 0.05,
                "ivlFct": 1,
                "maxIvl": 36500,
                "bury": true,
                "minSpace": 1
            },
            "lapse": {
                "delays": [10],
                "mult": 0,
                "minInt": 1,
                "leechFails": 8,
                "leechAction": 0
            }
        }
    })
}

/// Escape text for an HTML field, keeping line breaks
fn to_html(text: &str) -> String {
    html_escape::encode_text(text).replace('\n', "<br>")
}

/// Stable note guid from kind and field content
fn note_guid(kind: CardKind, fields: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.label().as_bytes());
    for field in fields {
        hasher.update([FIELD_SEPARATOR as u8]);
        hasher.update(field.as_bytes());
    }
    hex::encode(&hasher.finalize()[..8])
}

/// First 32 bits of the SHA-1 of the sort field, as stored in `notes.csum`
fn field_checksum(text: &str) -> i64 {
    let digest = Sha1::digest(text.as_bytes());
    i64::from(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::demo_cards;
    use std::io::{Cursor, Read};
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn sample_deck() -> Deck {
        let mut cards = vec![Flashcard::Basic {
            front: "What is <Rust>?".to_string(),
            back: "A language.\nFast & safe.".to_string(),
        }];
        cards.extend(demo_cards());
        Deck::new("Sample", cards)
    }

    fn open_collection(bytes: &[u8], dir: &TempDir) -> Connection {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut collection = Vec::new();
        archive
            .by_name(COLLECTION_FILE)
            .unwrap()
            .read_to_end(&mut collection)
            .unwrap();
        let path = dir.path().join(COLLECTION_FILE);
        fs::write(&path, collection).unwrap();
        Connection::open(path).unwrap()
    }

    #[test]
    fn test_package_ids_are_fixed() {
        let package = DeckPackage::from_deck(&sample_deck());
        assert_eq!(package.deck_id, 2059400110);
        assert_eq!(package.models.len(), CardKind::ALL.len());
        assert_eq!(package.models[0].id, 1607392319);
        assert_eq!(package.models[5].id, 1607392319 + 5);
        assert_eq!(package.notes.len(), 6);
    }

    #[test]
    fn test_note_fields_are_html() {
        let note = DeckNote::from_card(&sample_deck().cards[0]);
        assert_eq!(note.fields[0], "What is &lt;Rust&gt;?");
        assert_eq!(note.fields[1], "A language.<br>Fast &amp; safe.");
        assert_eq!(note.tags, vec!["Basic"]);
    }

    #[test]
    fn test_mcq_note_lists_options() {
        let note = DeckNote::from_card(&demo_cards()[0]);
        assert!(note.fields[0].contains("A. Mistral<br>B. BART<br>C. GPT<br>D. T5"));
        assert_eq!(note.fields[1], "A");
        assert_eq!(note.model_id, MODEL_ID + CardKind::Mcq.ordinal());
    }

    #[test]
    fn test_guid_is_deterministic() {
        let a = DeckPackage::from_deck(&sample_deck());
        let b = DeckPackage::from_deck(&sample_deck());
        assert_eq!(a.notes[0].guid, b.notes[0].guid);
        assert_ne!(a.notes[0].guid, a.notes[1].guid);
        assert_eq!(a.notes[0].guid.len(), 16);
    }

    #[test]
    fn test_archive_contents() {
        let bytes = AnkiPackageWriter
            .write_package(&DeckPackage::from_deck(&sample_deck()))
            .unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut names: Vec<String> = archive.file_names().map(|n| n.to_string()).collect();
        names.sort();
        assert_eq!(names, vec![COLLECTION_FILE.to_string(), "media".to_string()]);

        let mut media = String::new();
        archive.by_name("media").unwrap().read_to_string(&mut media).unwrap();
        assert_eq!(media, "{}");
    }

    #[test]
    fn test_collection_rows() {
        let deck = sample_deck();
        let bytes = AnkiPackageWriter
            .write_package(&DeckPackage::from_deck(&deck))
            .unwrap();
        let dir = TempDir::new().unwrap();
        let conn = open_collection(&bytes, &dir);

        let notes: i64 = conn.query_row("SELECT COUNT(*) FROM notes", [], |r| r.get(0)).unwrap();
        let cards: i64 = conn.query_row("SELECT COUNT(*) FROM cards", [], |r| r.get(0)).unwrap();
        assert_eq!(notes as usize, deck.len());
        assert_eq!(cards as usize, deck.len());

        let dids: Vec<i64> = conn
            .prepare("SELECT DISTINCT did FROM cards")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(dids, vec![DECK_ID]);

        let flds: String = conn
            .query_row("SELECT flds FROM notes ORDER BY id LIMIT 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(flds, "What is &lt;Rust&gt;?\x1fA language.<br>Fast &amp; safe.");

        let (models, decks): (String, String) = conn
            .query_row("SELECT models, decks FROM col", [], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        let models: Value = serde_json::from_str(&models).unwrap();
        assert_eq!(models.as_object().unwrap().len(), CardKind::ALL.len());
        assert_eq!(models[MODEL_ID.to_string()]["tmpls"][0]["qfmt"], "{{Question}}");

        let decks: Value = serde_json::from_str(&decks).unwrap();
        assert_eq!(decks[DECK_ID.to_string()]["name"], "Sample");
    }

    #[test]
    fn test_sort_field_checksum() {
        let sort_field = strip_html("What is &lt;Rust&gt;?");
        assert_eq!(sort_field, "What is <Rust>?");
        assert_eq!(field_checksum(&sort_field), 2467335411);

        let bytes = AnkiPackageWriter
            .write_package(&DeckPackage::from_deck(&sample_deck()))
            .unwrap();
        let dir = TempDir::new().unwrap();
        let conn = open_collection(&bytes, &dir);
        let (sfld, csum): (String, i64) = conn
            .query_row("SELECT sfld, csum FROM notes ORDER BY id LIMIT 1", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(sfld, "What is <Rust>?");
        assert_eq!(csum, 2467335411);
    }

    #[test]
    fn test_scratch_dir_removed_after_write() {
        let parent = TempDir::new().unwrap();
        let bytes = AnkiPackageWriter
            .write_package_in(parent.path(), &DeckPackage::from_deck(&sample_deck()))
            .unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_scratch_dir_removed_after_failure() {
        let parent = TempDir::new().unwrap();
        let mut package = DeckPackage::from_deck(&sample_deck());
        package.notes[1].model_id = 42;

        let result = AnkiPackageWriter.write_package_in(parent.path(), &package);
        assert!(matches!(result, Err(ExportError::Malformed(_))));
        assert_eq!(fs::read_dir(parent.path()).unwrap().count(), 0);
    }
}
