//! Chunked parallel neighborhood mapping.
//!
//! Each chunk walks its own cursor and collects values into a private buffer;
//! buffers are scattered into the output once every chunk has finished. The
//! output is identical to [`crate::map_neighborhood`] for any chunking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ops_core::{BorderMode, Cursor, Error, ImgView, ImgViewMut};
use rayon::prelude::*;

use crate::chunker::{Chunk, ChunkPlan, Chunking};
use crate::neighborhood::{Neighborhood, Sampler};
use crate::shape::Shape;

#[derive(Debug, Clone, Default)]
pub struct ParallelMapConfig {
    pub chunking: Chunking,
    /// Number of chunks; `0` uses the rayon pool size.
    pub num_chunks: usize,
    /// Checked before each chunk starts. A set flag aborts the map with
    /// [`Error::Cancelled`] and leaves the output untouched.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl ParallelMapConfig {
    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

pub fn par_map_neighborhood<I, O, S, F>(
    input: &ImgView<'_, I>,
    output: &mut ImgViewMut<'_, O>,
    shape: &S,
    border: &BorderMode<I>,
    config: &ParallelMapConfig,
    func: F,
) -> Result<(), Error>
where
    I: Sync,
    O: Send,
    S: Shape + ?Sized,
    F: Fn(&Neighborhood<'_, I>) -> O + Sync,
{
    Error::check_dims(input.num_dims(), output.num_dims())?;
    let sampler = Sampler::new(input, shape.resolve(input.num_dims())?, border)?;

    let dims = output.dims().to_vec();
    let strides = output.strides().to_vec();
    let num_chunks = match config.num_chunks {
        0 => rayon::current_num_threads(),
        n => n,
    };
    let plan = ChunkPlan::new(config.chunking, output.num_elements(), num_chunks);
    log::debug!(
        "parallel neighborhood map: {} positions in {} {:?} chunks",
        plan.total(),
        plan.len(),
        config.chunking
    );

    let buffers = plan
        .chunks()
        .par_iter()
        .map(|chunk| {
            if config.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let mut cursor = Cursor::new(&dims, &strides);
            let mut values = Vec::with_capacity(chunk.num_steps);
            walk(&mut cursor, chunk, |c| values.push(func(&sampler.at(c.position()))));
            Ok(values)
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let mut cursor = Cursor::new(&dims, &strides);
    let storage = output.storage_mut();
    for (chunk, values) in plan.chunks().iter().zip(buffers) {
        let mut values = values.into_iter();
        walk(&mut cursor, chunk, |c| {
            if let Some(v) = values.next() {
                storage[c.offset()] = v;
            }
        });
    }
    Ok(())
}

fn walk(cursor: &mut Cursor, chunk: &Chunk, mut visit: impl FnMut(&Cursor)) {
    cursor.set_index(chunk.start);
    for step in 0..chunk.num_steps {
        if step > 0 {
            cursor.jump_fwd(chunk.step);
        }
        visit(cursor);
    }
}
