//! claimcheck-core
//!
//! Core building blocks for claim-check style message offloading.
//!
//! 大きすぎるメッセージの payload を Blob ストアへ退避し、メッセージには
//! 小さな参照レコードだけを載せて送る。受信側で参照を解決し、Blob を削除する。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（attribute, message, envelope, reference, config, errors, outcome）
//! - **codec**: wire 形式（ReferenceCodec, BodyCodec）
//! - **ports**: 抽象化レイヤー（BlobStore, QueueTransport, Clock, KeyGenerator, PayloadOffloadMiddleware）
//! - **app**: アプリケーションロジック（SizeAccountant, PayloadStore, OffloadGate, Channel）
//! - **impls**: 実装（InMemoryBlobStore, InMemoryQueue など開発用）

pub mod domain;
pub mod codec;
pub mod ports;
pub mod app;
pub mod impls;
