//! Word providers.
//!
//! A [`WordSource`] answers "what is related to this word?". The session
//! only ever passes it normalized ids and applies its own per-merge cap,
//! but sources are expected to cap their answers too so payloads stay small.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use serde_json::Value;
use tracing::{debug, info, warn};
use wordweb_core::{dedupe_words, normalize_word, sanitize_input, WordPayload};

/// Related words returned per lookup by the bundled sources.
pub const DEFAULT_SOURCE_CAP: usize = 20;

/// Looks up the words related to a normalized word.
#[async_trait]
pub trait WordSource: Send + Sync {
    async fn fetch_word(&self, word: &str) -> Result<WordPayload, ProviderError>;

    /// Short name used in log output.
    fn name(&self) -> &str {
        "word-source"
    }
}

#[async_trait]
impl<T: WordSource + ?Sized> WordSource for Box<T> {
    async fn fetch_word(&self, word: &str) -> Result<WordPayload, ProviderError> {
        (**self).fetch_word(word).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: WordSource + ?Sized> WordSource for Arc<T> {
    async fn fetch_word(&self, word: &str) -> Result<WordPayload, ProviderError> {
        (**self).fetch_word(word).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StaticSource
// ─────────────────────────────────────────────────────────────────────────────

/// The bundled Turkish word table.
const BUILTIN_TABLE: &[(&str, &[&str])] = &[
    // Books and literature
    ("kitap", &["roman", "öykü", "şiir", "yazı", "yazar", "okuma", "kütüphane", "sayfa", "kağıt", "basım", "edebiyat", "hikaye", "ders", "bilgi", "öğrenim"]),
    ("roman", &["kitap", "yazar", "karakter", "hikaye", "edebiyat", "okuma", "kurgu", "anlatı", "sayfa", "bölüm", "kahraman", "olay", "tema", "stil"]),
    ("yazar", &["kitap", "roman", "yazmak", "kalem", "hikaye", "şiir", "edebiyat", "metin", "kelime", "cümle", "düşünce", "sanat", "yaratıcılık"]),
    // Writing and language
    ("yazmak", &["yazar", "kalem", "kağıt", "kelime", "cümle", "metin", "yazı", "harf", "düşünce", "ifade", "anlatım", "dil"]),
    ("kelime", &["harf", "ses", "anlam", "cümle", "dil", "sözcük", "kavram", "ifade", "yazı", "konuşma", "düşünce", "iletişim"]),
    ("cümle", &["kelime", "nokta", "virgül", "anlam", "düşünce", "yazı", "gramer", "sözdizimi", "ifade", "metin"]),
    // Reading and learning
    ("okuma", &["kitap", "göz", "anlama", "öğrenme", "bilgi", "ders", "eğitim", "kültür", "gelişim", "zeka", "dikkat", "kavrama"]),
    ("öğrenme", &["ders", "okul", "öğretmen", "bilgi", "zeka", "hafıza", "anlama", "gelişim", "eğitim", "çalışma", "pratik"]),
    ("ders", &["öğretmen", "öğrenci", "okul", "bilgi", "öğrenme", "eğitim", "sınıf", "konu", "anlama", "çalışma"]),
    // Education
    ("okul", &["öğrenci", "öğretmen", "ders", "sınıf", "eğitim", "öğrenme", "bilgi", "gelişim", "arkadaş", "kitap", "not"]),
    ("öğretmen", &["ders", "öğrenci", "okul", "eğitim", "bilgi", "öğrenme", "sınıf", "anlatım", "rehberlik", "gelişim"]),
    ("öğrenci", &["okul", "ders", "öğretmen", "öğrenme", "kitap", "sınıf", "arkadaş", "not", "sınav", "gelişim"]),
    // Nature
    ("ağaç", &["yaprak", "dal", "kök", "gövde", "orman", "doğa", "yeşil", "büyüme", "mevsim", "meyve", "çiçek", "gölge"]),
    ("yaprak", &["ağaç", "yeşil", "dal", "sonbahar", "sarı", "düşmek", "doğa", "fotosentez", "güneş", "rüzgar"]),
    ("orman", &["ağaç", "yeşil", "doğa", "hayvan", "kuş", "hava", "oksijen", "sessizlik", "gölge", "yürüyüş"]),
    // Colors
    ("yeşil", &["yaprak", "ağaç", "çim", "doğa", "renk", "mavi", "sarı", "güzel", "taze", "umut", "büyüme"]),
    ("mavi", &["gökyüzü", "deniz", "renk", "yeşil", "kırmızı", "sakinlik", "serinlik", "güzel", "derinlik"]),
    ("kırmızı", &["kan", "aşk", "ateş", "renk", "mavi", "sarı", "güçlü", "sıcaklık", "dikkat", "tehlike"]),
    // Family
    ("aile", &["anne", "baba", "çocuk", "kardeş", "ev", "sevgi", "birliktelik", "mutluluk", "güven", "destek"]),
    ("anne", &["baba", "çocuk", "aile", "sevgi", "şefkat", "bakım", "koruma", "ev", "yemek", "öpücük"]),
    ("baba", &["anne", "çocuk", "aile", "güç", "koruma", "çalışma", "para", "destek", "oyun", "sevgi"]),
    ("çocuk", &["anne", "baba", "oyun", "okul", "büyüme", "masum", "neşe", "öğrenme", "gelecek", "hayat"]),
    // Emotions
    ("sevgi", &["aşk", "kalp", "mutluluk", "aile", "anne", "dostluk", "şefkat", "bağlılık", "güven", "paylaşım"]),
    ("mutluluk", &["gülümseme", "neşe", "sevinç", "sevgi", "keyif", "huzur", "yaşam", "pozitif", "enerji"]),
    ("üzüntü", &["gözyaşı", "hüzün", "acı", "kayıp", "yalnızlık", "kalp", "anı", "özlem", "sessizlik"]),
    // Time
    ("zaman", &["saat", "dakika", "saniye", "gün", "ay", "yıl", "geçmek", "beklemek", "hızlı", "yavaş", "an"]),
    ("gün", &["güneş", "sabah", "öğle", "akşam", "gece", "ışık", "çalışma", "yaşam", "rutin", "aktivite"]),
    ("gece", &["karanlık", "ay", "yıldız", "uyku", "rüya", "sessizlik", "dinlenmek", "huzur", "soğuk"]),
    // Weather and seasons
    ("güneş", &["ışık", "sıcaklık", "sarı", "parlak", "enerji", "gün", "yaz", "doğa", "yaşam", "güç"]),
    ("yağmur", &["su", "bulut", "gökyüzü", "serinlik", "temizlik", "büyüme", "şemsiye", "ses", "koku"]),
    ("kar", &["beyaz", "soğuk", "kış", "temiz", "sessizlik", "güzel", "yumuşak", "çocuk", "oyun"]),
    ("sözlük", &["kelime", "anlam", "dil", "kitap", "öğrenme", "bilgi", "çeviri", "açıklama"]),
];

/// An in-memory word table.
///
/// Answers are deterministic: related words come back in table order, cut
/// to the source cap. Unknown words get an empty list, not an error.
#[derive(Debug, Clone)]
pub struct StaticSource {
    table: HashMap<String, Vec<String>>,
    cap: usize,
    latency: Option<Duration>,
}

impl StaticSource {
    /// A source backed by the bundled Turkish table.
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN_TABLE
                .iter()
                .map(|(word, related)| {
                    let related: Vec<String> = related.iter().map(|r| r.to_string()).collect();
                    (word.to_string(), related)
                }),
        )
    }

    /// A source backed by the given `(word, related)` entries.
    ///
    /// Keys are normalized; later entries for the same key win.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let table = entries
            .into_iter()
            .map(|(word, related)| (normalize_word(&word), related))
            .collect();

        Self {
            table,
            cap: DEFAULT_SOURCE_CAP,
            latency: None,
        }
    }

    /// Overrides how many related words a lookup returns.
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// Delays every lookup, standing in for a remote store.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of words in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn lookup(&self, word: &str) -> WordPayload {
        let id = normalize_word(word);
        let related: Vec<String> = self
            .table
            .get(&id)
            .map(|related| related.iter().take(self.cap).cloned().collect())
            .unwrap_or_default();
        WordPayload::new(id, related)
    }
}

#[async_trait]
impl WordSource for StaticSource {
    async fn fetch_word(&self, word: &str) -> Result<WordPayload, ProviderError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let payload = self.lookup(word);
        debug!("static lookup {:?}: {} related", word, payload.related.len());
        Ok(payload)
    }

    fn name(&self) -> &str {
        "static"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DictionarySource
// ─────────────────────────────────────────────────────────────────────────────

/// One row of a dictionary export.
#[derive(Debug, Clone, Deserialize)]
pub struct DictionaryRow {
    pub word: String,
    #[serde(default)]
    pub related_words: Vec<String>,
}

/// A word table loaded from a JSON dictionary export.
///
/// The file holds an array of `{ "word": ..., "related_words": [...] }`
/// rows. A row with a malformed related list loads with no related words;
/// a row without a usable word is skipped. Markup characters are stripped
/// and related lists de-duplicated on load.
#[derive(Debug, Clone)]
pub struct DictionarySource {
    inner: StaticSource,
}

impl DictionarySource {
    /// Loads a dictionary from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let source = Self::from_json(&text)?;
        info!(
            "Loaded {} dictionary entries from {}",
            source.len(),
            path.display()
        );
        Ok(source)
    }

    /// Parses a dictionary from JSON text.
    ///
    /// Only a top level that is not an array is an error.
    pub fn from_json(text: &str) -> Result<Self, ProviderError> {
        let values: Vec<Value> = serde_json::from_str(text)?;
        let rows = values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let payload = WordPayload::from_value(value, "");
                if payload.word.is_empty() {
                    warn!("Dictionary row {} has no word, skipping", i);
                }
                DictionaryRow {
                    word: payload.word,
                    related_words: payload.related,
                }
            })
            .collect();
        Ok(Self::from_rows(rows))
    }

    pub fn from_rows(rows: Vec<DictionaryRow>) -> Self {
        let entries = rows
            .into_iter()
            .map(|row| {
                let related: Vec<String> = row
                    .related_words
                    .iter()
                    .map(|w| sanitize_input(w))
                    .collect();
                (sanitize_input(&row.word), dedupe_words(&related))
            })
            .filter(|(word, _)| !normalize_word(word).is_empty());
        Self {
            inner: StaticSource::from_entries(entries),
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.inner = self.inner.with_cap(cap);
        self
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl WordSource for DictionarySource {
    async fn fetch_word(&self, word: &str) -> Result<WordPayload, ProviderError> {
        self.inner.fetch_word(word).await
    }

    fn name(&self) -> &str {
        "dictionary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_lookup() {
        let source = StaticSource::builtin();
        let payload = source.fetch_word("kitap").await.unwrap();

        assert_eq!(payload.word, "kitap");
        assert_eq!(payload.related.first().map(String::as_str), Some("roman"));
        assert!(payload.related.len() <= DEFAULT_SOURCE_CAP);
    }

    #[tokio::test]
    async fn test_unknown_word_is_empty() {
        let source = StaticSource::builtin();
        let payload = source.fetch_word("bilinmeyen").await.unwrap();
        assert_eq!(payload, WordPayload::empty("bilinmeyen"));
    }

    #[tokio::test]
    async fn test_cap_applies() {
        let related: Vec<String> = (0..40).map(|i| format!("w{}", i)).collect();
        let source = StaticSource::from_entries([("kök".to_string(), related)]).with_cap(20);

        let payload = source.fetch_word("kök").await.unwrap();
        assert_eq!(payload.related.len(), 20);
        assert_eq!(payload.related[19], "w19");
    }

    #[tokio::test]
    async fn test_keys_are_normalized() {
        let source = StaticSource::from_entries([("  IŞIK ".to_string(), vec!["güneş".to_string()])]);
        let payload = source.fetch_word("ışık").await.unwrap();
        assert_eq!(payload.related, vec!["güneş"]);
    }

    #[tokio::test]
    async fn test_dictionary_from_json() {
        let json = r#"[
            { "word": "Kitap", "related_words": ["Roman", "roman", "yazar"] },
            { "word": "roman" },
            { "word": "   ", "related_words": ["boş"] }
        ]"#;
        let source = DictionarySource::from_json(json).unwrap();
        assert_eq!(source.len(), 2);

        let kitap = source.fetch_word("kitap").await.unwrap();
        assert_eq!(kitap.related, vec!["roman", "yazar"]);

        let roman = source.fetch_word("roman").await.unwrap();
        assert!(roman.related.is_empty());
    }

    #[tokio::test]
    async fn test_dictionary_tolerates_malformed_rows() {
        let json = r#"[
            { "word": "kitap", "related_words": ["roman"] },
            { "word": "roman", "related_words": "kitap" },
            { "word": "yazar", "related_words": null },
            { "related_words": ["sahipsiz"] },
            42
        ]"#;
        let source = DictionarySource::from_json(json).unwrap();
        assert_eq!(source.len(), 3);

        let kitap = source.fetch_word("kitap").await.unwrap();
        assert_eq!(kitap.related, vec!["roman"]);
        assert!(source.fetch_word("roman").await.unwrap().related.is_empty());
        assert!(source.fetch_word("yazar").await.unwrap().related.is_empty());
    }

    #[tokio::test]
    async fn test_dictionary_strips_markup() {
        let json = r#"[{ "word": "kitap", "related_words": ["'roman'", "Roman", "yazar;"] }]"#;
        let source = DictionarySource::from_json(json).unwrap();

        let kitap = source.fetch_word("kitap").await.unwrap();
        assert_eq!(kitap.related, vec!["roman", "yazar"]);
    }

    #[test]
    fn test_dictionary_rejects_bad_json() {
        assert!(matches!(
            DictionarySource::from_json("{ not json"),
            Err(ProviderError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_boxed_source() {
        let source: Box<dyn WordSource> = Box::new(StaticSource::builtin());
        assert_eq!(source.name(), "static");
        assert!(!source.fetch_word("ağaç").await.unwrap().related.is_empty());
    }
}
