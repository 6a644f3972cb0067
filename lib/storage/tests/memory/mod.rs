mod mem_quad_storage;
