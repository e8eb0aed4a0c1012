//! Property tests for chunking, partition isolation and index consistency.

mod common;

use std::sync::Arc;

use common::memory_store;
use docchat_rag::{Chunker, DocumentManager, RecursiveChunker, TextSpan, UploadedFile};
use proptest::prelude::*;

/// Rebuild a document from its chunks by dropping each chunk's overlap with the previous one.
fn rebuild(spans: &[TextSpan]) -> String {
    let mut out = String::new();
    let mut covered = 0;
    for span in spans {
        out.extend(span.text.chars().skip(covered - span.start));
        covered = span.start + span.text.chars().count();
    }
    out
}

fn arb_document() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{0,3000}",
        "([a-z]{1,12}[ .!?\n]{1,2}){0,400}",
        "([a-zа-яé]{1,8}( |\n\n|\\. )){0,300}",
    ]
}

/// **Chunk coverage**: for any document, the chunks in order, with overlaps
/// dropped, rebuild the document exactly; no chunk exceeds the chunk size.
mod prop_chunk_coverage {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn default_sizes_rebuild_the_document(text in arb_document()) {
            let spans = RecursiveChunker::new(1200, 600).split(&text);
            prop_assert!(spans.iter().all(|s| s.text.chars().count() <= 1200));
            prop_assert_eq!(rebuild(&spans), text);
        }

        #[test]
        fn any_sizes_rebuild_the_document(
            text in arb_document(),
            size in 1usize..300,
            overlap in 0usize..300,
        ) {
            let chunker = RecursiveChunker::new(size, overlap);
            let spans = chunker.split(&text);
            prop_assert!(spans.iter().all(|s| s.text.chars().count() <= size.max(1)));
            prop_assert!(spans.windows(2).all(|w| w[0].start < w[1].start));
            prop_assert_eq!(rebuild(&spans), text);
        }
    }
}

#[derive(Debug, Clone)]
enum Op {
    Ingest { partition: usize, words: Vec<String> },
    DeleteDocument { pick: usize },
    Purge { partition: usize },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..3, proptest::collection::vec("[a-f]{1,4}", 1..60))
            .prop_map(|(partition, words)| Op::Ingest { partition, words }),
        2 => any::<usize>().prop_map(|pick| Op::DeleteDocument { pick }),
        1 => (0usize..3).prop_map(|partition| Op::Purge { partition }),
    ]
}

const PARTITIONS: [&str; 3] = ["chat_a", "chat_b", "chat_c"];

/// **Partition isolation** and **index/store consistency** over arbitrary
/// sequences of ingest and delete operations.
mod prop_index_consistency {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn slot_sets_agree_and_searches_stay_in_partition(
            ops in proptest::collection::vec(arb_op(), 1..12),
            query in "[a-f]{1,4}( [a-f]{1,4}){0,4}",
            k in 1usize..20,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let store = memory_store().await;
                let docs = DocumentManager::new(Arc::clone(&store), Arc::new(RecursiveChunker::new(40, 10)));
                let mut live: Vec<(String, &str)> = Vec::new();

                for op in ops {
                    match op {
                        Op::Ingest { partition, words } => {
                            let pk = PARTITIONS[partition];
                            let report = docs
                                .ingest(&[UploadedFile::text("doc.txt", words.join(" "))], pk)
                                .await
                                .unwrap();
                            live.extend(report.documents.into_iter().map(|d| (d.doc_id, pk)));
                        }
                        Op::DeleteDocument { pick } if !live.is_empty() => {
                            let (doc_id, pk) = live.remove(pick % live.len());
                            prop_assert!(docs.delete_document(&doc_id, pk).await.unwrap() > 0);
                        }
                        Op::DeleteDocument { .. } => {}
                        Op::Purge { partition } => {
                            let pk = PARTITIONS[partition];
                            docs.purge_partition(pk).await.unwrap();
                            live.retain(|(_, p)| *p != pk);
                        }
                    }

                    let (index_slots, mapped_slots) = store.slot_sets().await;
                    prop_assert_eq!(index_slots, mapped_slots);
                    store.verify().await.unwrap();
                }

                for pk in PARTITIONS {
                    let hits = store.search(&query, k, pk).await.unwrap();
                    prop_assert!(hits.len() <= k);
                    prop_assert!(hits.iter().all(|h| h.chunk.partition_key == pk));
                    prop_assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));

                    let mut expected: Vec<&str> =
                        live.iter().filter(|(_, p)| *p == pk).map(|(d, _)| d.as_str()).collect();
                    expected.sort_unstable();
                    let mut listed: Vec<String> =
                        docs.list_documents(pk).await.into_iter().map(|d| d.doc_id).collect();
                    listed.sort_unstable();
                    prop_assert_eq!(listed, expected);
                }
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}
