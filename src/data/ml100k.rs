use anyhow::{bail, Context, Result};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::io::BufRead;
use std::path::Path;

/// One observed rating. Ids are 0-based table indices, unlike the 1-based
/// ids in the raw file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interaction {
    pub user: usize,
    pub item: usize,
    pub rating: f32,
}

/// MovieLens 100K ratings table: `user<TAB>item<TAB>rating<TAB>timestamp`
/// rows. Vocabulary sizes are derived from the largest id seen.
#[derive(Clone, Debug)]
pub struct Ml100k {
    interactions: Vec<Interaction>,
    num_users: usize,
    num_items: usize,
}

impl Ml100k {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening ratings file {}", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut interactions = Vec::new();
        let mut num_users = 0usize;
        let mut num_items = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let row = parse_row(&line).with_context(|| format!("ratings row {}", idx + 1))?;
            num_users = num_users.max(row.user + 1);
            num_items = num_items.max(row.item + 1);
            interactions.push(row);
        }

        if interactions.is_empty() {
            bail!("ratings input contains no rows");
        }
        Ok(Self {
            interactions,
            num_users,
            num_items,
        })
    }

    pub fn num_users(&self) -> usize {
        self.num_users
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Deterministic shuffled split into (train, validation). Duplicate
    /// (user, item) rows are kept wherever the shuffle puts them.
    pub fn split(&self, valid_fraction: f32, seed: u64) -> (Vec<Interaction>, Vec<Interaction>) {
        let mut rows = self.interactions.clone();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        rows.shuffle(&mut rng);

        let n_valid = ((rows.len() as f32) * valid_fraction).round() as usize;
        let n_valid = n_valid.min(rows.len());
        let valid = rows.split_off(rows.len() - n_valid);
        (rows, valid)
    }
}

fn parse_row(line: &str) -> Result<Interaction> {
    let mut fields = line.split_whitespace();
    let user: usize = fields
        .next()
        .context("missing user id")?
        .parse()
        .context("user id is not an integer")?;
    let item: usize = fields
        .next()
        .context("missing item id")?
        .parse()
        .context("item id is not an integer")?;
    let rating: f32 = fields
        .next()
        .context("missing rating")?
        .parse()
        .context("rating is not a number")?;
    // Timestamp column: required in the format, unused downstream.
    let _ts: i64 = fields
        .next()
        .context("missing timestamp")?
        .parse()
        .context("timestamp is not an integer")?;

    if user == 0 || item == 0 {
        bail!("ids are 1-based in the raw file; got user={user} item={item}");
    }
    Ok(Interaction {
        user: user - 1,
        item: item - 1,
        rating,
    })
}
