use std::sync::Arc;

use ragbench_core::{DocumentId, PositionAwareChunk, VectorStore};
use ragbench_vector::InMemoryVectorStore;

#[tokio::test]
async fn search_on_empty_index_is_empty_for_any_k() {
    let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
    for k in [1usize, 3, 1000] {
        let hits = store.search(&[0.3, 0.4, 0.5], k).await.expect("search");
        assert!(hits.is_empty(), "k={k}");
    }
}

#[tokio::test]
async fn batches_appended_in_order_rank_deterministically() {
    let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
    let doc = DocumentId::from("doc.md");
    for batch in 0..3 {
        let chunks: Vec<PositionAwareChunk> = (0..4)
            .map(|i| {
                let n = batch * 4 + i;
                PositionAwareChunk::new(doc.clone(), format!("chunk {n}"), n * 10, n * 10 + 7)
            })
            .collect();
        let embeddings = vec![vec![1.0, 1.0]; chunks.len()];
        store.add(&chunks, &embeddings).await.expect("add");
    }
    let hits = store.search(&[1.0, 1.0], 5).await.expect("search");
    let starts: Vec<usize> = hits.iter().map(|h| h.chunk.start).collect();
    assert_eq!(starts, vec![0, 10, 20, 30, 40]);
}
