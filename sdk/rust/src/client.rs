use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Most key points sent when asking for video recommendations.
pub const MAX_VIDEO_KEY_POINTS: usize = 8;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The backend answered successfully but not with the expected JSON.
    #[error("unexpected response: {body}")]
    UnexpectedBody { body: String },

    #[error("file must be a .pdf: {0}")]
    NotPdf(String),
}

/// OCR and generation tuning sent with a PDF upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyOptions {
    pub ocr_lang: String,
    pub dpi: u32,
    pub min_char_threshold: u32,
    pub psm: u32,
    pub prefer_blocks: bool,
    pub num_cards: u32,
    pub num_questions: u32,
    pub difficulty: String,
}

impl Default for StudyOptions {
    fn default() -> Self {
        Self {
            ocr_lang: "eng".to_string(),
            dpi: 200,
            min_char_threshold: 120,
            psm: 6,
            prefer_blocks: true,
            num_cards: 10,
            num_questions: 6,
            difficulty: "medium".to_string(),
        }
    }
}

impl StudyOptions {
    fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ocr_lang", self.ocr_lang.clone()),
            ("dpi", self.dpi.to_string()),
            ("min_char_threshold", self.min_char_threshold.to_string()),
            ("psm", self.psm.to_string()),
            ("prefer_blocks", self.prefer_blocks.to_string()),
            ("num_cards", self.num_cards.to_string()),
            ("num_questions", self.num_questions.to_string()),
            ("difficulty", self.difficulty.clone()),
        ]
    }
}

/// Study pack generated from a PDF. Missing fields default to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyMaterial {
    pub summary: String,
    pub key_topics: Vec<String>,
    pub key_points: Vec<String>,
    pub flashcards: Vec<serde_json::Value>,
    pub quiz: Vec<serde_json::Value>,
    pub text: String,
    pub ocr_pages: Vec<serde_json::Value>,
    pub page_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Videos {
    pub videos: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct VideoRequest<'a> {
    key_points: &'a [String],
    max_results: u32,
}

#[derive(Debug, Serialize)]
struct QuestionRequest<'a> {
    text: &'a str,
    question: &'a str,
}

#[derive(Debug, Deserialize)]
struct Answer {
    answer: String,
}

pub struct StudyClient {
    client: Client,
    base_url: String,
}

impl StudyClient {
    /// `base_url` is the proxy mount, e.g. `https://site.example/api/proxy`.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Upload a PDF and generate summary, flashcards and quiz.
    pub async fn study_material(
        &self,
        file_name: &str,
        pdf: Vec<u8>,
        options: &StudyOptions,
    ) -> Result<StudyMaterial, ClientError> {
        if !file_name.to_lowercase().ends_with(".pdf") {
            return Err(ClientError::NotPdf(file_name.to_string()));
        }

        let part = Part::bytes(pdf)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")?;
        let form = options
            .form_fields()
            .into_iter()
            .fold(Form::new().part("file", part), |form, (name, value)| form.text(name, value));

        let resp = self
            .client
            .post(self.endpoint("/api/study_material"))
            .multipart(form)
            .send()
            .await?;
        read_json(resp).await
    }

    /// Recommend videos for up to eight key points.
    pub async fn recommend_videos(
        &self,
        key_points: &[String],
        max_results: u32,
    ) -> Result<Videos, ClientError> {
        let key_points = &key_points[..key_points.len().min(MAX_VIDEO_KEY_POINTS)];
        let resp = self
            .client
            .post(self.endpoint("/api/recommend_videos"))
            .json(&VideoRequest { key_points, max_results })
            .send()
            .await?;
        read_json(resp).await
    }

    /// Ask a question about previously extracted text.
    pub async fn ask_question(&self, text: &str, question: &str) -> Result<String, ClientError> {
        let resp = self
            .client
            .post(self.endpoint("/api/ask_question"))
            .json(&QuestionRequest { text, question })
            .send()
            .await?;
        let answer: Answer = read_json(resp).await?;
        Ok(answer.answer)
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    let text = resp.text().await?;
    parse_body(status, text)
}

/// Non-JSON bodies are surfaced as raw text rather than dropped.
fn parse_body<T: DeserializeOwned>(status: StatusCode, text: String) -> Result<T, ClientError> {
    if !status.is_success() {
        return Err(ClientError::Status { status, body: text });
    }
    serde_json::from_str(&text).map_err(|_| ClientError::UnexpectedBody { body: text })
}
