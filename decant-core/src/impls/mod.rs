mod scalar;

mod option;

mod pointer;

mod list;

mod map;

mod opaque;
