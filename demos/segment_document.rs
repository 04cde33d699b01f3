//! Document Segmentation
//!
//! The minimal example: compile a grammar once, scan a mixed-format
//! document, and print the typed chunks with their spans.
//!
//! ```bash
//! cargo run --example segment_document
//! ```

use seams::{Grammar, Limits};

fn main() -> Result<(), seams::Error> {
    let document = "\
# Training Neural Networks

The training process involves three key steps:

1. Forward pass computes predictions
2. Loss compares predictions against ground truth
3. Backpropagation updates the weights

> Gradient descent is older than it looks.

```python
loss.backward()
optimizer.step()
```

Deep learning stacks many such layers. Early layers detect edges! 🚀";

    let grammar = Grammar::compile(&Limits::default())?;
    let chunks = grammar.scan(document);

    println!("Document: {} bytes", document.len());
    println!("Chunks: {}\n", chunks.len());

    for (i, chunk) in chunks.iter().enumerate() {
        println!(
            "[{i}] {:<15} {:>3}..{:<3} {:?}",
            chunk.kind.as_str(),
            chunk.start,
            chunk.end,
            chunk.content
        );
    }

    // Offsets are byte positions in the original document, so every chunk
    // can be sliced straight back out of it.
    for chunk in &chunks {
        assert_eq!(&document[chunk.span()], chunk.content);
    }
    Ok(())
}
