pub mod shared {
    pub mod infrastructure {
        pub mod versioned_store;
    }
}

pub mod modules {
    pub mod scores {
        pub mod core {
            pub mod merge;
            pub mod score_table;
            pub mod vote;
        }
        pub mod use_cases {
            pub mod submit_votes {
                pub mod backoff;
                pub mod coordinator;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod get_scores {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
}

pub mod shell;
