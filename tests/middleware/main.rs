mod helpers;

mod extensions;
