/// Selects which of the four screen quadrants the current frame refreshes.
/// The player never receives a full frame: each chunk updates one quarter of
/// the screen, and four consecutive chunks cover all of it.
#[derive(Debug, Default)]
pub struct GridSequencer {
    gridpos: u64,
}

impl GridSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_quadrant(&self) -> usize {
        (self.gridpos % 4) as usize
    }

    /// Call exactly once per processed frame. The position never resets.
    pub fn advance(&mut self) {
        self.gridpos += 1;
    }

    pub fn frames_processed(&self) -> u64 {
        self.gridpos
    }
}

#[derive(Debug, Default)]
pub struct StatsAccumulator {
    chunks: u64,
    payload_bytes: u64,
}

impl StatsAccumulator {
    pub fn record(&mut self, payload_len: u64) {
        self.chunks += 1;
        self.payload_bytes += payload_len;
    }

    pub fn chunk_count(&self) -> u64 {
        self.chunks
    }

    pub fn payload_bytes(&self) -> u64 {
        self.payload_bytes
    }

    pub fn avg_chunk_size(&self) -> u64 {
        if self.chunks == 0 {
            0
        } else {
            self.payload_bytes / self.chunks
        }
    }
}
