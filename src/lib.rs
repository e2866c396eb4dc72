//! Subgen - Subtitle Generation Workflow
//!
//! Transcribes audio and video with whisper, optionally translates every
//! segment with an ollama-hosted LLM, and writes SRT subtitle files.

pub mod cli;
pub mod config;
pub mod generator;
pub mod transcribe;
pub mod translate;
pub mod subtitle;
pub mod error;
