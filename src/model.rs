use burn::{
    module::Module,
    nn::{Embedding, EmbeddingConfig, Initializer},
    tensor::{backend::Backend, Int, Tensor},
};

/// Biased latent-factor model: rating(u, i) = dot(Q_u, I_i) + b_u + c_i.
///
/// Factor and bias tables are fixed-size at construction; ids outside
/// [0, num_users) / [0, num_items) panic inside the backend's gather.
#[derive(Module, Debug)]
pub struct MatrixFactorization<B: Backend> {
    pub user_factors: Embedding<B>,
    pub user_bias: Embedding<B>,
    pub item_factors: Embedding<B>,
    pub item_bias: Embedding<B>,
}

#[derive(Clone, Debug)]
pub struct MatrixFactorizationConfig {
    pub embedding_dims: usize,
    pub num_users: usize,
    pub num_items: usize,
    /// Storage hint for optimizers that skip untouched embedding rows.
    /// AdamW updates the full tables either way, so this changes nothing
    /// for the dense path.
    pub sparse: bool,
}

impl MatrixFactorizationConfig {
    pub fn new(embedding_dims: usize, num_users: usize, num_items: usize) -> Self {
        Self {
            embedding_dims,
            num_users,
            num_items,
            sparse: false,
        }
    }

    pub fn with_sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> MatrixFactorization<B> {
        // All four tables start from N(0, 0.01), biases included.
        let initializer = Initializer::Normal {
            mean: 0.0,
            std: 0.01,
        };
        MatrixFactorization {
            user_factors: EmbeddingConfig::new(self.num_users, self.embedding_dims)
                .with_initializer(initializer.clone())
                .init(device),
            user_bias: EmbeddingConfig::new(self.num_users, 1)
                .with_initializer(initializer.clone())
                .init(device),
            item_factors: EmbeddingConfig::new(self.num_items, self.embedding_dims)
                .with_initializer(initializer.clone())
                .init(device),
            item_bias: EmbeddingConfig::new(self.num_items, 1)
                .with_initializer(initializer)
                .init(device),
        }
    }
}

impl<B: Backend> MatrixFactorization<B> {
    /// user_ids, item_ids: [N] -> predicted ratings [N]
    pub fn forward(&self, user_ids: Tensor<B, 1, Int>, item_ids: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        let n = user_ids.dims()[0];
        let users = user_ids.unsqueeze_dim::<2>(1); // [N,1]
        let items = item_ids.unsqueeze_dim::<2>(1); // [N,1]

        let q: Tensor<B, 2> = self.user_factors.forward(users.clone()).squeeze(1); // [N,D]
        let b_u: Tensor<B, 1> = self.user_bias.forward(users).reshape([n]); // [N]

        let f: Tensor<B, 2> = self.item_factors.forward(items.clone()).squeeze(1); // [N,D]
        let c_i: Tensor<B, 1> = self.item_bias.forward(items).reshape([n]); // [N]

        let interaction: Tensor<B, 1> = (q * f).sum_dim(1).squeeze(1); // [N]
        interaction + b_u + c_i
    }
}
