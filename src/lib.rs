pub mod shared {
    pub mod infrastructure {
        pub mod event_store;
        pub mod stream_locks;
    }
}

pub mod modules {
    pub mod streams {
        pub mod core {
            pub mod events;
            pub mod expected_version;
        }
        pub mod use_cases {
            pub mod append_event {
                pub mod command;
                pub mod decide;
                pub mod decision;
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod resolve_current_version {
                pub mod handler;
            }
        }
    }
}

pub mod shell;
