//! Local sentence embeddings via candle.
//!
//! Two model instances serve the pipeline: a base-sized model for full
//! remark text and a small one for short category-name text. Both are BERT
//! sentence-transformers pulled from the Hugging Face Hub on first use,
//! mean-pooled over the attention mask and L2-normalized.

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, HiddenAct, DTYPE};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::error::PipelineError;

/// Hub id of the model used for full remark text.
pub const REMARK_MODEL_ID: &str = "BAAI/bge-base-en-v1.5";

/// Hub id of the smaller model used for short category-name text.
pub const NAME_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

const REVISION: &str = "main";

/// Texts embedded per forward pass.
const BATCH_SIZE: usize = 32;

/// Maps a batch of texts to fixed-length normalized vectors.
pub trait Embedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, PipelineError>;

    /// Output dimensionality, fixed per instance.
    fn dimension(&self) -> usize;
}

/// BERT sentence-embedding model running locally on CPU.
pub struct LocalEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimension: usize,
}

impl LocalEmbedder {
    /// Download (or reuse cached) model files from the Hub and load them.
    pub fn load(model_id: &str) -> Result<Self, PipelineError> {
        let device = Device::Cpu;

        let api = Api::new()
            .map_err(|e| PipelineError::Embedding(format!("failed to create HF API: {}", e)))?;
        let repo = api.repo(Repo::with_revision(
            model_id.to_string(),
            RepoType::Model,
            REVISION.to_string(),
        ));

        let config_path = repo
            .get("config.json")
            .map_err(|e| PipelineError::Embedding(format!("failed to download config: {}", e)))?;
        let tokenizer_path = repo.get("tokenizer.json").map_err(|e| {
            PipelineError::Embedding(format!("failed to download tokenizer: {}", e))
        })?;
        let weights_path = repo.get("model.safetensors").map_err(|e| {
            PipelineError::Embedding(format!("failed to download weights: {}", e))
        })?;

        let config_str = std::fs::read_to_string(&config_path)?;
        // The output dimensionality comes from the checkpoint's own config
        let raw: serde_json::Value = serde_json::from_str(&config_str)
            .map_err(|e| PipelineError::Embedding(format!("failed to parse config: {}", e)))?;
        let dimension = raw
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| {
                PipelineError::Embedding("model config has no hidden_size".to_string())
            })? as usize;

        let mut config: Config = serde_json::from_str(&config_str)
            .map_err(|e| PipelineError::Embedding(format!("failed to parse config: {}", e)))?;

        // The sentence-transformers checkpoints use gelu activation
        config.hidden_act = HiddenAct::Gelu;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| PipelineError::Embedding(format!("failed to load tokenizer: {}", e)))?;
        let padding = PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        };
        let truncation = TruncationParams {
            max_length: 512,
            ..Default::default()
        };
        tokenizer.with_padding(Some(padding));
        tokenizer
            .with_truncation(Some(truncation))
            .map_err(|e| PipelineError::Embedding(format!("failed to set truncation: {}", e)))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)
                .map_err(|e| PipelineError::Embedding(format!("failed to load weights: {}", e)))?
        };
        let model = BertModel::load(vb, &config)
            .map_err(|e| PipelineError::Embedding(format!("failed to build model: {}", e)))?;

        println!("[Embeddings] Model loaded: {} ({}d)", model_id, dimension);

        Ok(Self {
            model,
            tokenizer,
            device,
            dimension,
        })
    }

    /// One forward pass over a batch: tokenize, mean-pool, L2-normalize.
    fn forward_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, PipelineError> {
        let embed_err = |stage: &str, e: candle_core::Error| {
            PipelineError::Embedding(format!("{} failed: {}", stage, e))
        };

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| PipelineError::Embedding(format!("tokenization failed: {}", e)))?;

        let batch = encodings.len();
        let seq_len = encodings[0].get_ids().len();

        let mut all_ids = Vec::with_capacity(batch * seq_len);
        let mut all_mask = Vec::with_capacity(batch * seq_len);
        let mut all_type_ids = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            all_ids.extend(encoding.get_ids().iter().map(|&x| x as i64));
            all_mask.extend(encoding.get_attention_mask().iter().map(|&x| x as i64));
            all_type_ids.extend(encoding.get_type_ids().iter().map(|&x| x as i64));
        }

        let input_ids = Tensor::from_vec(all_ids, (batch, seq_len), &self.device)
            .map_err(|e| embed_err("input_ids tensor", e))?;
        let attention_mask = Tensor::from_vec(all_mask, (batch, seq_len), &self.device)
            .map_err(|e| embed_err("attention_mask tensor", e))?;
        let token_type_ids = Tensor::from_vec(all_type_ids, (batch, seq_len), &self.device)
            .map_err(|e| embed_err("token_type_ids tensor", e))?;

        let hidden_states = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(|e| embed_err("model forward", e))?;

        // Mean pooling with the attention mask
        let mask_expanded = attention_mask
            .unsqueeze(2)
            .map_err(|e| embed_err("unsqueeze", e))?
            .to_dtype(DTYPE)
            .map_err(|e| embed_err("dtype conversion", e))?
            .broadcast_as(hidden_states.shape())
            .map_err(|e| embed_err("broadcast", e))?;
        let summed = hidden_states
            .mul(&mask_expanded)
            .map_err(|e| embed_err("mask multiply", e))?
            .sum(1)
            .map_err(|e| embed_err("sum", e))?;
        let mask_sum = mask_expanded
            .sum(1)
            .map_err(|e| embed_err("mask sum", e))?
            .clamp(1e-9, f64::MAX)
            .map_err(|e| embed_err("clamp", e))?;
        let pooled = summed.div(&mask_sum).map_err(|e| embed_err("divide", e))?;

        // L2 normalize
        let norm = pooled
            .sqr()
            .map_err(|e| embed_err("sqr", e))?
            .sum_keepdim(1)
            .map_err(|e| embed_err("sum keepdim", e))?
            .sqrt()
            .map_err(|e| embed_err("sqrt", e))?
            .clamp(1e-12, f64::MAX)
            .map_err(|e| embed_err("norm clamp", e))?;
        let normalized = pooled
            .broadcast_div(&norm)
            .map_err(|e| embed_err("normalize", e))?;

        let rows: Vec<Vec<f32>> = normalized.to_vec2().map_err(|e| embed_err("to_vec2", e))?;
        Ok(rows)
    }
}

impl Embedder for LocalEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, PipelineError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut results = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(BATCH_SIZE) {
            results.extend(self.forward_batch(chunk)?);
        }
        Ok(results)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
